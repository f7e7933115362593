use serde::{Deserialize, Serialize};
use xchg_types::{CaptureRegion, RegionSlot};

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RegionsConfig {
    pub ratio: Option<CaptureRegion>,
    pub left: Option<CaptureRegion>,
    pub right: Option<CaptureRegion>,
    /// Refuse region changes while set
    pub locked: bool,
}

impl RegionsConfig {
    pub fn get(&self, slot: RegionSlot) -> Option<CaptureRegion> {
        match slot {
            RegionSlot::Ratio => self.ratio,
            RegionSlot::Left => self.left,
            RegionSlot::Right => self.right,
        }
    }

    pub fn set(&mut self, slot: RegionSlot, region: CaptureRegion) {
        let target = match slot {
            RegionSlot::Ratio => &mut self.ratio,
            RegionSlot::Left => &mut self.left,
            RegionSlot::Right => &mut self.right,
        };
        *target = Some(region);
    }

    pub fn missing(&self) -> Vec<RegionSlot> {
        RegionSlot::ALL
            .into_iter()
            .filter(|slot| self.get(*slot).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// All three regions, in ratio/left/right order
    pub fn all(&self) -> Option<[CaptureRegion; 3]> {
        Some([self.ratio?, self.left?, self.right?])
    }

    pub fn describe(&self) -> String {
        RegionSlot::ALL
            .into_iter()
            .map(|slot| match self.get(slot) {
                Some(region) => format!("{slot}: {region}"),
                None => format!("{slot}: not set"),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
