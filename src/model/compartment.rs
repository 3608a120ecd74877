use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of compartments tracked per cohort.
pub const N_COMPARTMENTS: usize = 6;

/// Compartments in state-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Compartment {
    #[serde(rename = "S")]
    Susceptible,
    #[serde(rename = "E")]
    Exposed,
    #[serde(rename = "I")]
    Infectious,
    /// Severe cases on the path to death.
    #[serde(rename = "M")]
    Severe,
    #[serde(rename = "R")]
    Recovered,
    #[serde(rename = "D")]
    Dead,
}

impl Compartment {
    pub const ALL: [Compartment; N_COMPARTMENTS] = [
        Compartment::Susceptible,
        Compartment::Exposed,
        Compartment::Infectious,
        Compartment::Severe,
        Compartment::Recovered,
        Compartment::Dead,
    ];

    /// Offset inside a cohort block.
    pub fn offset(self) -> usize {
        match self {
            Compartment::Susceptible => 0,
            Compartment::Exposed => 1,
            Compartment::Infectious => 2,
            Compartment::Severe => 3,
            Compartment::Recovered => 4,
            Compartment::Dead => 5,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Compartment::Susceptible => "S",
            Compartment::Exposed => "E",
            Compartment::Infectious => "I",
            Compartment::Severe => "M",
            Compartment::Recovered => "R",
            Compartment::Dead => "D",
        }
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Index of `compartment` for cohort `a` in the flat state vector.
/// Layout per cohort block: S | E | I | M | R | D
#[inline]
pub fn index(a: usize, compartment: Compartment) -> usize {
    a * N_COMPARTMENTS + compartment.offset()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_declaration_order() {
        for (i, c) in Compartment::ALL.iter().enumerate() {
            assert_eq!(c.offset(), i);
            assert_eq!(Compartment::ALL[i], *c);
        }
    }

    #[test]
    fn index_is_cohort_major() {
        assert_eq!(index(0, Compartment::Susceptible), 0);
        assert_eq!(index(1, Compartment::Susceptible), 6);
        assert_eq!(index(2, Compartment::Dead), 17);
    }
}
