//! Per-season mutable competitor state.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::{Competitor, CompetitorId};

/// One season's copy of the pool. Live ratings mutate here and nowhere else.
#[derive(Debug, Clone)]
pub struct Roster {
    competitors: Vec<Competitor>,
    index: HashMap<CompetitorId, usize>,
}

impl Roster {
    pub(crate) fn new(competitors: Vec<Competitor>) -> Self {
        let index = competitors
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();
        Self { competitors, index }
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    /// Ids in pool order.
    pub fn ids(&self) -> Vec<CompetitorId> {
        self.competitors.iter().map(|c| c.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Competitor> {
        self.competitors.iter()
    }

    pub fn contains(&self, id: CompetitorId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: CompetitorId) -> Option<&Competitor> {
        self.index.get(&id).map(|&i| &self.competitors[i])
    }

    pub fn get_mut(&mut self, id: CompetitorId) -> Option<&mut Competitor> {
        let i = *self.index.get(&id)?;
        Some(&mut self.competitors[i])
    }

    /// Live rating, or negative infinity for an unknown id.
    pub fn rating(&self, id: CompetitorId) -> f64 {
        self.get(id).map_or(f64::NEG_INFINITY, |c| c.rating)
    }

    /// Mutable access to two distinct competitors at once.
    ///
    /// Returns `None` if either id is unknown or both ids are equal.
    pub fn pair_mut(
        &mut self,
        a: CompetitorId,
        b: CompetitorId,
    ) -> Option<(&mut Competitor, &mut Competitor)> {
        let ia = *self.index.get(&a)?;
        let ib = *self.index.get(&b)?;
        match ia.cmp(&ib) {
            Ordering::Equal => None,
            Ordering::Less => {
                let (left, right) = self.competitors.split_at_mut(ib);
                Some((&mut left[ia], &mut right[0]))
            }
            Ordering::Greater => {
                let (left, right) = self.competitors.split_at_mut(ia);
                Some((&mut right[0], &mut left[ib]))
            }
        }
    }

    /// Seeding order: live rating desc, then baseline desc, then id asc.
    ///
    /// Used for bracket seeding, rating lists and every tie that has no
    /// format-specific tiebreak.
    pub fn seed_cmp(&self, a: CompetitorId, b: CompetitorId) -> Ordering {
        match (self.get(a), self.get(b)) {
            (Some(ca), Some(cb)) => cb
                .rating
                .partial_cmp(&ca.rating)
                .unwrap_or(Ordering::Equal)
                .then_with(|| cb.baseline.partial_cmp(&ca.baseline).unwrap_or(Ordering::Equal))
                .then_with(|| a.cmp(&b)),
            _ => a.cmp(&b),
        }
    }

    pub fn sort_by_seed(&self, ids: &mut [CompetitorId]) {
        ids.sort_by(|&a, &b| self.seed_cmp(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new(vec![
            Competitor::new(1, "a", 2600.0),
            Competitor::new(2, "b", 2700.0),
            Competitor::new(3, "c", 2700.0),
        ])
    }

    #[test]
    fn pair_mut_returns_both_in_argument_order() {
        let mut r = roster();
        let (a, b) = r.pair_mut(CompetitorId(3), CompetitorId(1)).unwrap();
        assert_eq!(a.id, CompetitorId(3));
        assert_eq!(b.id, CompetitorId(1));
        a.rating += 1.0;
        b.rating -= 1.0;
        assert_eq!(r.rating(CompetitorId(3)), 2701.0);
        assert_eq!(r.rating(CompetitorId(1)), 2599.0);
    }

    #[test]
    fn pair_mut_rejects_same_id() {
        let mut r = roster();
        assert!(r.pair_mut(CompetitorId(2), CompetitorId(2)).is_none());
        assert!(r.pair_mut(CompetitorId(2), CompetitorId(9)).is_none());
    }

    #[test]
    fn seed_order_uses_rating_then_id() {
        let r = roster();
        let mut ids = r.ids();
        r.sort_by_seed(&mut ids);
        assert_eq!(ids, vec![CompetitorId(2), CompetitorId(3), CompetitorId(1)]);
    }
}
