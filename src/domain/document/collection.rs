use serde::{Deserialize, Serialize};

/// Document collections owned by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Categories,
    BaseServices,
    ProfessionalServices,
    ServiceProviders,
    Professionals,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Categories,
        Collection::BaseServices,
        Collection::ProfessionalServices,
        Collection::ServiceProviders,
        Collection::Professionals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::BaseServices => "base_services",
            Self::ProfessionalServices => "professional_services",
            Self::ServiceProviders => "service_providers",
            Self::Professionals => "professionals",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown collection: {}", s))
    }
}
