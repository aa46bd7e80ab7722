//! Motion detector output types.

use crate::geometry::{Point, Rect};

/// A single moving region reported by a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionRegion {
    pub region: Rect,
}

impl MotionRegion {
    #[inline]
    pub const fn new(region: Rect) -> Self {
        Self { region }
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.region.area()
    }

    #[inline]
    pub fn center(&self) -> Point {
        self.region.center()
    }
}

impl From<Rect> for MotionRegion {
    fn from(region: Rect) -> Self {
        Self::new(region)
    }
}

/// Regions found in one frame, in detector output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionResult {
    regions: Vec<MotionRegion>,
}

impl DetectionResult {
    pub fn new(regions: Vec<MotionRegion>) -> Self {
        Self { regions }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn regions(&self) -> &[MotionRegion] {
        &self.regions
    }

    pub fn into_regions(self) -> Vec<MotionRegion> {
        self.regions
    }

    #[inline]
    pub fn is_detected(&self) -> bool {
        !self.regions.is_empty()
    }

    /// Largest region by area. Ties go to the earliest region in detector order.
    pub fn biggest(&self) -> Option<&MotionRegion> {
        let mut best: Option<&MotionRegion> = None;
        for r in &self.regions {
            match best {
                Some(b) if r.area() <= b.area() => {}
                _ => best = Some(r),
            }
        }
        best
    }
}

impl FromIterator<MotionRegion> for DetectionResult {
    fn from_iter<I: IntoIterator<Item = MotionRegion>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Tuning passed through to the detector on every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetectSettings {
    /// Regions smaller than this many square pixels are ignored.
    pub min_region_area: u64,
    /// Regions larger than this are ignored; 0 means unlimited.
    pub max_region_area: u64,
}

impl DetectSettings {
    pub fn accepts(&self, region: &MotionRegion) -> bool {
        let area = region.area();
        area >= self.min_region_area && (self.max_region_area == 0 || area <= self.max_region_area)
    }
}
