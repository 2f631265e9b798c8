//! Random selection of library entries.
//!
//! Two strategies, chosen by [`SelectionConfig::balanced`]:
//!
//! - **Uniform**: a uniform sample without replacement. Every subset of the
//!   requested size is equally likely, and the result comes back shuffled.
//! - **Artist-balanced**: entries are grouped by [`GroupKey`] into an
//!   [`ArtistPool`]. Each draw first picks an artist uniformly among those
//!   with the fewest picks so far, then one of that artist's remaining
//!   entries uniformly. Artists drop out of the pool once exhausted, so later
//!   draws are spread evenly over whoever is left.
//!
//! Selection is total: empty input, a zero count, or a count larger than the
//! collection simply yield a short or empty result.

use crate::entry::GroupKey;
use log::{debug, trace};
use rand::seq::index;
use rand::Rng;
use std::collections::HashMap;

/// How many entries to pick, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionConfig {
    /// Desired number of results.
    pub count: usize,
    /// Give every artist the same chance, regardless of catalogue size.
    pub balanced: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            count: 1,
            balanced: false,
        }
    }
}

impl SelectionConfig {
    #[must_use]
    pub const fn new(count: usize, balanced: bool) -> Self {
        Self { count, balanced }
    }
}

/// Select entries with the thread-local generator.
///
/// The generator is seeded from the OS, so separate runs give different
/// picks. `entries` is only borrowed; selected entries are cloned into the
/// returned vector.
///
/// # Examples
///
/// ```
/// use randpick::entry::GroupKey;
/// use randpick::selector::{select, SelectionConfig};
///
/// #[derive(Clone)]
/// struct Track(&'static str);
///
/// impl GroupKey for Track {
///     fn group_key(&self) -> &str {
///         self.0
///     }
/// }
///
/// let tracks = vec![Track("A"), Track("A"), Track("B")];
/// let picked = select(&tracks, &SelectionConfig::new(2, true));
/// assert_eq!(picked.len(), 2);
/// assert_ne!(picked[0].0, picked[1].0);
/// ```
#[must_use]
pub fn select<T>(entries: &[T], config: &SelectionConfig) -> Vec<T>
where
    T: Clone + GroupKey,
{
    select_with_rng(entries, config, &mut rand::thread_rng())
}

/// Same as [`select`], drawing from the supplied generator.
#[must_use]
pub fn select_with_rng<T, R>(entries: &[T], config: &SelectionConfig, rng: &mut R) -> Vec<T>
where
    T: Clone + GroupKey,
    R: Rng + ?Sized,
{
    let selected = if config.balanced {
        select_balanced(entries, config.count, rng)
    } else {
        select_uniform(entries, config.count, rng)
    };

    debug!(
        "Selected {} of {} entries (requested {}, balanced: {})",
        selected.len(),
        entries.len(),
        config.count,
        config.balanced
    );
    selected
}

/// Uniform sample without replacement, in random order.
fn select_uniform<T, R>(entries: &[T], count: usize, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let amount = count.min(entries.len());
    index::sample(rng, entries.len(), amount)
        .into_iter()
        .map(|i| entries[i].clone())
        .collect()
}

fn select_balanced<T, R>(entries: &[T], count: usize, rng: &mut R) -> Vec<T>
where
    T: Clone + GroupKey,
    R: Rng + ?Sized,
{
    let mut pool = ArtistPool::build(entries);
    debug!(
        "Built artist pool: {} artists over {} entries",
        pool.artist_count(),
        entries.len()
    );

    let mut selected = Vec::with_capacity(count.min(entries.len()));
    while selected.len() < count {
        // Pool exhausted before reaching the count: short result.
        let Some(entry) = pool.draw(rng) else {
            break;
        };
        selected.push(entry.clone());
    }
    selected
}

/// Remaining candidates per artist, consumed by balanced selection.
///
/// Groups live in an indexable vector so the artist draw never goes through
/// a map's key view. Draws happen in rounds: within a round each artist is
/// eligible once, and a new round opens when every remaining artist has
/// contributed. Exhausted artists leave the pool immediately.
///
/// The vector is split in two: `groups[..eligible]` have not contributed in
/// the current round, `groups[eligible..]` have.
#[derive(Debug)]
pub struct ArtistPool<'a, T> {
    groups: Vec<(&'a str, Vec<&'a T>)>,
    eligible: usize,
}

impl<'a, T: GroupKey> ArtistPool<'a, T> {
    /// Group `entries` by exact key equality, keeping input order per group.
    #[must_use]
    pub fn build(entries: &'a [T]) -> Self {
        let mut positions: HashMap<&'a str, usize> = HashMap::new();
        let mut groups: Vec<(&'a str, Vec<&'a T>)> = Vec::new();

        for entry in entries {
            let key = entry.group_key();
            match positions.get(key) {
                Some(&position) => groups[position].1.push(entry),
                None => {
                    positions.insert(key, groups.len());
                    groups.push((key, vec![entry]));
                }
            }
        }

        let eligible = groups.len();
        Self { groups, eligible }
    }

    /// Number of artists that still have entries.
    #[must_use]
    pub fn artist_count(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Artists that still have entries, in no particular order.
    #[cfg(test)]
    fn artists(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.groups.iter().map(|(key, _)| *key)
    }

    /// Artists the next draw may pick from.
    #[cfg(test)]
    fn eligible_artists(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.groups[..self.eligible].iter().map(|(key, _)| *key)
    }

    /// Remove and return one entry: a uniformly chosen eligible artist, then
    /// a uniformly chosen entry of that artist. `None` once the pool is empty.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&'a T> {
        if self.groups.is_empty() {
            return None;
        }

        let group_index = rng.gen_range(0..self.eligible);
        let (key, members) = &mut self.groups[group_index];
        let member_index = rng.gen_range(0..members.len());
        let entry = members.swap_remove(member_index);
        let exhausted = members.is_empty();
        trace!("Drew entry {member_index} from artist `{key}'");

        // Move the artist to the front of the spent section.
        self.eligible -= 1;
        self.groups.swap(group_index, self.eligible);
        if exhausted {
            trace!("Artist `{}' exhausted", self.groups[self.eligible].0);
            self.groups.swap_remove(self.eligible);
        }

        if self.eligible == 0 {
            self.eligible = self.groups.len();
        }

        Some(entry)
    }
}
