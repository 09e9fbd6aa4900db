use crate::{
    constants::{FADE_LABEL, MAX_EXACT_COUNT},
    sections::{SectionCatalog, SectionKind},
};

/// Measures and beats assigned to one section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionLength {
    pub measures: u64,
    pub beats: f64,
}

/// One requested section after allocation.
///
/// `length` is `None` when the allocator had no beat budget or measure size
/// to work with.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSection {
    pub kind: SectionKind,
    pub length: Option<SectionLength>,
}

impl PlacedSection {
    fn unallocated(kind: SectionKind) -> Self {
        Self { kind, length: None }
    }

    fn allocated(kind: SectionKind, measures: u64, beats_per_measure: f64) -> Self {
        Self {
            kind,
            length: Some(SectionLength {
                measures,
                beats: measures as f64 * beats_per_measure,
            }),
        }
    }

    pub fn measures(&self) -> Option<u64> {
        self.length.map(|l| l.measures)
    }

    pub fn beats(&self) -> Option<f64> {
        self.length.map(|l| l.beats)
    }

    fn grow(&mut self, measures: u64, beats_per_measure: f64) {
        if let Some(length) = self.length.as_mut() {
            length.measures += measures;
            length.beats += measures as f64 * beats_per_measure;
        }
    }
}

/// Trailing beats too short to make up a whole measure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fade {
    pub beats: u64,
}

/// Result of one allocation: sections in request order, then an optional fade.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arrangement {
    pub sections: Vec<PlacedSection>,
    pub fade: Option<Fade>,
    /// Whole leftover measures no section could absorb
    pub unplaced_measures: u64,
}

/// A row of an arrangement, as the front end lists it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry<'a> {
    Section(&'a PlacedSection),
    Fade(Fade),
}

impl Entry<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Entry::Section(section) => section.kind.into(),
            Entry::Fade(_) => FADE_LABEL,
        }
    }

    pub fn measures(&self) -> Option<u64> {
        match self {
            Entry::Section(section) => section.measures(),
            Entry::Fade(_) => None,
        }
    }

    pub fn beats(&self) -> Option<f64> {
        match self {
            Entry::Section(section) => section.beats(),
            Entry::Fade(fade) => Some(fade.beats as f64),
        }
    }
}

impl Arrangement {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.fade.is_none()
    }

    /// True when every section received a length
    pub fn is_allocated(&self) -> bool {
        !self.sections.is_empty() && self.sections.iter().all(|s| s.length.is_some())
    }

    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.sections
            .iter()
            .map(Entry::Section)
            .chain(self.fade.map(Entry::Fade))
    }

    pub fn total_measures(&self) -> u64 {
        self.sections.iter().filter_map(PlacedSection::measures).sum()
    }

    /// Section beats plus fade beats
    pub fn total_beats(&self) -> f64 {
        self.entries().filter_map(|entry| entry.beats()).sum()
    }
}

/// Allocate measures using the built-in catalog.
pub fn allocate(kinds: &[SectionKind], total_beats: f64, beats_per_measure: f64) -> Arrangement {
    allocate_in(
        SectionCatalog::builtin(),
        kinds,
        total_beats,
        beats_per_measure,
    )
}

/// Split `total_beats` across `kinds` in proportion to their catalog weights.
///
/// Each section is rounded down to a whole multiple of its increment. The
/// measures lost to rounding are handed back out in rank order, and any
/// remainder shorter than a measure becomes the fade. Sections keep their
/// request order. Budgets above 2^53 beats or measures are left unallocated.
pub fn allocate_in(
    catalog: &SectionCatalog,
    kinds: &[SectionKind],
    total_beats: f64,
    beats_per_measure: f64,
) -> Arrangement {
    if kinds.is_empty() {
        return Arrangement::default();
    }
    if !is_positive(total_beats) || !is_positive(beats_per_measure) {
        log::debug!(
            "no beat budget ({total_beats}) or measure size ({beats_per_measure}), leaving {} sections unallocated",
            kinds.len()
        );
        return unallocated(kinds);
    }
    if total_beats > MAX_EXACT_COUNT || total_beats / beats_per_measure > MAX_EXACT_COUNT {
        log::warn!(
            "beat budget {total_beats} ({beats_per_measure} per measure) is too large to count exactly, leaving sections unallocated"
        );
        return unallocated(kinds);
    }

    let weight_sum: f64 = kinds.iter().map(|&kind| catalog.get(kind).weight).sum();
    log::debug!("weight sum: {weight_sum}");

    let mut spill = 0.0;
    let mut sections = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let def = catalog.get(kind);
        let raw = (total_beats * (def.weight / weight_sum)) / beats_per_measure;
        let step = def.increment() as f64;
        let measures = (raw / step).floor() * step;
        spill += raw - measures;
        sections.push(PlacedSection::allocated(
            kind,
            measures as u64,
            beats_per_measure,
        ));
    }

    let whole = spill.floor();
    let overflow = whole as u64;
    let fade_beats = ((spill - whole) * beats_per_measure).floor() as u64;
    log::debug!("spill: {spill:.3} measures, overflow: {overflow}, fade: {fade_beats} beats");

    let unplaced_measures = distribute_overflow(catalog, &mut sections, overflow, beats_per_measure);
    if unplaced_measures > 0 {
        log::warn!("{unplaced_measures} leftover measures could not be placed and were dropped");
    }

    Arrangement {
        sections,
        fade: (fade_beats > 0).then_some(Fade { beats: fade_beats }),
        unplaced_measures,
    }
}

fn unallocated(kinds: &[SectionKind]) -> Arrangement {
    Arrangement {
        sections: kinds.iter().copied().map(PlacedSection::unallocated).collect(),
        ..Default::default()
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Hand `overflow` measures to sections in repeated rank-ordered passes.
///
/// Balanced types take one increment on every instance or nothing; the
/// others give one increment to their first instance per pass. Stops after
/// a pass that places nothing and returns what is left.
fn distribute_overflow(
    catalog: &SectionCatalog,
    sections: &mut [PlacedSection],
    mut overflow: u64,
    beats_per_measure: f64,
) -> u64 {
    let mut pass = 0;
    while overflow > 0 {
        pass += 1;
        let before = overflow;

        for (kind, def) in catalog.ranked() {
            let step = def.increment();
            if overflow < step {
                continue;
            }

            if def.balance {
                let count = sections.iter().filter(|s| s.kind == kind).count() as u64;
                if count.saturating_mul(step) > overflow {
                    continue;
                }
                for section in sections.iter_mut().filter(|s| s.kind == kind) {
                    section.grow(step, beats_per_measure);
                    overflow -= step;
                }
            } else if let Some(section) = sections.iter_mut().find(|s| s.kind == kind) {
                section.grow(step, beats_per_measure);
                overflow -= step;
            }
        }

        log::debug!(
            "pass {pass}: placed {} measures, {overflow} left",
            before - overflow
        );
        if overflow == before {
            break;
        }
    }
    overflow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::SectionDef;
    use SectionKind::*;

    fn measures(arrangement: &Arrangement) -> Vec<Option<u64>> {
        arrangement.sections.iter().map(|s| s.measures()).collect()
    }

    fn placed(kinds: &[SectionKind], measures: u64) -> Vec<PlacedSection> {
        kinds
            .iter()
            .map(|&kind| PlacedSection::allocated(kind, measures, 4.0))
            .collect()
    }

    #[test]
    fn test_empty_request() {
        let arrangement = allocate(&[], 576.0, 4.0);
        assert!(arrangement.is_empty());
        assert_eq!(arrangement.entries().count(), 0);

        assert!(allocate(&[], 0.0, 0.0).is_empty());
    }

    #[test]
    fn test_missing_budget_leaves_sections_unallocated() {
        let kinds = [Intro, Verse, Outro];
        for (beats, bpm) in [(0.0, 4.0), (576.0, 0.0), (f64::NAN, 4.0), (-8.0, 4.0)] {
            let arrangement = allocate(&kinds, beats, bpm);
            let got: Vec<SectionKind> = arrangement.sections.iter().map(|s| s.kind).collect();
            assert_eq!(got, kinds);
            assert!(arrangement.sections.iter().all(|s| s.length.is_none()));
            assert!(arrangement.fade.is_none());
            assert!(!arrangement.is_allocated());
        }
    }

    #[test]
    fn test_two_sections_with_unplaceable_measure() {
        let arrangement = allocate(&[Verse, Drop], 140.0, 4.0);

        assert_eq!(
            arrangement.sections,
            vec![
                PlacedSection::allocated(Verse, 20, 4.0),
                PlacedSection::allocated(Drop, 14, 4.0),
            ]
        );
        assert_eq!(arrangement.sections[0].beats(), Some(80.0));
        assert_eq!(arrangement.sections[1].beats(), Some(56.0));
        assert!(arrangement.fade.is_none());
        assert_eq!(arrangement.unplaced_measures, 1);
        assert_eq!(arrangement.total_beats(), 136.0);
    }

    #[test]
    fn test_full_song_fills_budget_exactly() {
        // 4:30 at 128 BPM
        let kinds = [Intro, Verse, Build, Drop, Break, Verse, Build, Drop, Outro];
        let arrangement = allocate(&kinds, 576.0, 4.0);

        assert_eq!(
            measures(&arrangement),
            [8, 24, 12, 18, 20, 24, 12, 18, 8].map(Some).to_vec()
        );
        assert!(arrangement.fade.is_none());
        assert_eq!(arrangement.unplaced_measures, 0);
        assert_eq!(arrangement.total_measures(), 144);
        assert_eq!(arrangement.total_beats(), 576.0);
    }

    #[test]
    fn test_fade_takes_sub_measure_remainder() {
        let arrangement = allocate(&[Intro, Verse, Verse, Verse, Outro], 100.0, 4.0);

        assert_eq!(
            measures(&arrangement),
            [2, 6, 6, 6, 4].map(Some).to_vec()
        );
        assert_eq!(arrangement.fade, Some(Fade { beats: 3 }));
        assert_eq!(arrangement.unplaced_measures, 0);

        let last = arrangement.entries().last().unwrap();
        assert_eq!(last.label(), "Fade");
        assert_eq!(last.measures(), None);
        assert_eq!(last.beats(), Some(3.0));
    }

    #[test]
    fn test_unbalanced_type_is_greedy() {
        // Both Break instances start at 10; only the first one grows
        let arrangement = allocate(&[Intro, Break, Break, Outro], 130.0, 4.0);

        assert_eq!(
            measures(&arrangement),
            [4, 12, 10, 6].map(Some).to_vec()
        );
        assert_eq!(arrangement.fade, Some(Fade { beats: 2 }));
    }

    #[test]
    fn test_balanced_type_is_all_or_nothing() {
        let arrangement = allocate(&[Verse, Verse, Verse], 91.2, 4.0);

        // 4 leftover measures cannot give each of three Verses +2
        assert_eq!(measures(&arrangement), [6, 6, 6].map(Some).to_vec());
        assert_eq!(arrangement.unplaced_measures, 4);
        assert_eq!(arrangement.fade, Some(Fade { beats: 3 }));
    }

    #[test]
    fn test_lower_rank_wins_leftover() {
        // Build and Bridge share weight 2; Bridge has rank 3, Build rank 6
        let mut sections = placed(&[Build, Bridge], 4);
        let left = distribute_overflow(SectionCatalog::builtin(), &mut sections, 2, 4.0);

        assert_eq!(left, 0);
        assert_eq!(sections[0].measures(), Some(4));
        assert_eq!(sections[1].measures(), Some(6));
        assert_eq!(sections[1].beats(), Some(24.0));
    }

    #[test]
    fn test_balanced_increment_reaches_every_instance() {
        let mut sections = placed(&[Verse, Intro, Verse], 4);
        let left = distribute_overflow(SectionCatalog::builtin(), &mut sections, 6, 4.0);

        // pass 1: Intro +2, then both Verses +2
        assert_eq!(left, 0);
        assert_eq!(
            sections.iter().map(|s| s.measures()).collect::<Vec<_>>(),
            vec![Some(6), Some(6), Some(6)]
        );
    }

    #[test]
    fn test_overflow_below_every_increment_terminates() {
        let mut sections = placed(&[Verse, Drop], 4);
        let left = distribute_overflow(SectionCatalog::builtin(), &mut sections, 1, 4.0);

        assert_eq!(left, 1);
        assert!(sections.iter().all(|s| s.measures() == Some(4)));
    }

    #[test]
    fn test_odd_length_types_grow_by_one() {
        let catalog = SectionCatalog::builtin()
            .with_definition(Break, SectionDef::new(2.5, false, 1, false))
            .with_definition(Verse, SectionDef::new(4.0, false, 5, true));

        let mut breaks = placed(&[Break, Break], 3);
        assert_eq!(distribute_overflow(&catalog, &mut breaks, 3, 4.0), 0);
        assert_eq!(breaks[0].measures(), Some(6));
        assert_eq!(breaks[1].measures(), Some(3));

        let mut verses = placed(&[Verse, Verse], 3);
        assert_eq!(distribute_overflow(&catalog, &mut verses, 3, 4.0), 1);
        assert_eq!(verses[0].measures(), Some(4));
        assert_eq!(verses[1].measures(), Some(4));
    }

    #[test]
    fn test_odd_length_rounding_is_plain_floor() {
        let catalog = SectionCatalog::builtin()
            .with_definition(Verse, SectionDef::new(4.0, false, 5, true))
            .with_definition(Drop, SectionDef::new(3.0, false, 7, true));

        // raw Verse 20, raw Drop 15: nothing is lost
        let arrangement = allocate_in(&catalog, &[Verse, Drop], 140.0, 4.0);
        assert_eq!(measures(&arrangement), vec![Some(20), Some(15)]);
        assert_eq!(arrangement.unplaced_measures, 0);
        assert_eq!(arrangement.total_beats(), 140.0);
    }

    #[test]
    fn test_even_and_conservation_hold() {
        let structures: [&[SectionKind]; 4] = [
            &[Intro, Verse, Build, Drop, Outro],
            &[Verse, PreChorus, Drop, Verse, PreChorus, Drop, Bridge, Drop, Outro],
            &[Break, BreakSm, BreakLg, Break],
            &[Intro, Verse, Verse, Verse, Verse, Outro],
        ];
        let budgets = [(57.0, 4.0), (325.5, 3.0), (576.0, 4.0), (1000.0, 7.0), (12.0, 4.0)];

        for kinds in structures {
            for (total, bpm) in budgets {
                let arrangement = allocate(kinds, total, bpm);
                for section in &arrangement.sections {
                    let m = section.measures().unwrap();
                    assert_eq!(m % 2, 0, "{:?} got {m} measures", section.kind);
                    assert_eq!(section.beats().unwrap(), m as f64 * bpm);
                }

                let allocated = arrangement.total_beats();
                let slack = (arrangement.unplaced_measures + 1) as f64 * bpm;
                assert!(allocated <= total + 1e-9, "{allocated} > {total}");
                assert!(total - allocated < slack, "{total} - {allocated} >= {slack}");
            }
        }
    }

    #[test]
    fn test_budget_beyond_u32_measures() {
        let arrangement = allocate(&[Verse, Intro], 4e10, 4.0);

        assert_eq!(
            measures(&arrangement),
            vec![Some(8_000_000_000), Some(2_000_000_000)]
        );
        assert_eq!(arrangement.unplaced_measures, 0);
        assert!(arrangement.fade.is_none());
        assert_eq!(arrangement.total_beats(), 4e10);
    }

    #[test]
    fn test_budget_too_large_to_count_is_left_unallocated() {
        for (beats, bpm) in [(1e300, 4.0), (1e16, 4.0), (1e15, 1e-3)] {
            let arrangement = allocate(&[Verse, Drop], beats, bpm);
            assert_eq!(arrangement.sections.len(), 2);
            assert!(arrangement.sections.iter().all(|s| s.length.is_none()));
            assert!(arrangement.fade.is_none());
        }
    }

    #[test]
    fn test_custom_weights_shift_the_split() {
        let catalog = SectionCatalog::builtin()
            .with_definition(Verse, SectionDef::new(1.0, true, 5, true));

        // Verse and Intro now weigh the same
        let arrangement = allocate_in(&catalog, &[Intro, Verse], 64.0, 4.0);
        assert_eq!(measures(&arrangement), vec![Some(8), Some(8)]);
        assert!(arrangement.is_allocated());
    }
}
