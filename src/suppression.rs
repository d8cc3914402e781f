/// Per-category suppression verdict for one evaluation.
///
/// Always derived from the current snapshot's flags, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Suppression {
    /// Energy is at capacity; carried for the summary log.
    pub energy: bool,
    pub drug: bool,
    pub booster: bool,
    pub medical: bool,
    pub cash: bool,
}

impl Suppression {
    pub fn from_flags(energy_full: bool, traveling: bool, in_hospital: bool, in_jail: bool) -> Self {
        Self {
            energy: energy_full,
            drug: energy_full || traveling || in_jail,
            booster: traveling || in_hospital || in_jail,
            medical: traveling || in_hospital || in_jail,
            cash: traveling || in_jail,
        }
    }

    /// Names of the active suppressions, in log order.
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (self.energy, "Energy"),
            (self.drug, "Drug"),
            (self.booster, "Booster"),
            (self.medical, "Medical"),
            (self.cash, "Cash"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect()
    }
}
