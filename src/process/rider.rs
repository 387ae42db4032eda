use std::fmt;

/// Two-valued rider classification shared by every export vintage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiderType {
    Member,
    Casual,
}

impl RiderType {
    /// Map a raw label to its canonical type. Pre-2021 exports use
    /// `Subscriber`/`Customer`; newer ones use `member`/`casual`.
    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "member" | "subscriber" => Some(RiderType::Member),
            "casual" | "customer" => Some(RiderType::Casual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiderType::Member => "member",
            RiderType::Casual => "casual",
        }
    }
}

impl fmt::Display for RiderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_labels_unify() {
        assert_eq!(RiderType::from_label("member"), Some(RiderType::Member));
        assert_eq!(RiderType::from_label("Subscriber"), Some(RiderType::Member));
        assert_eq!(RiderType::from_label(" casual "), Some(RiderType::Casual));
        assert_eq!(RiderType::from_label("Customer"), Some(RiderType::Casual));
        assert_eq!(RiderType::from_label("Dependent"), None);
        assert_eq!(RiderType::from_label(""), None);
    }
}
