use serde::{Deserialize, Serialize};

/// Request a membership of another type.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MembershipRequestDescriptor {
    pub membership_type: String,
    /// Defaults to the current academic year.
    #[serde(default)]
    pub year: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RenewDescriptor {
    /// Defaults to the current academic year.
    #[serde(default)]
    pub year: Option<String>,
    /// Defaults to `["basic"]` when empty.
    #[serde(default)]
    pub types: Vec<String>,
}

pub mod manage {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, Clone)]
    pub struct MembershipTargetDescriptor {
        pub row_id: i64,
    }

    #[derive(Serialize, Deserialize, Debug, Clone)]
    pub struct AddTypeDescriptor {
        pub id: String,
        pub label: String,
    }

    #[derive(Serialize, Deserialize, Debug, Clone)]
    pub struct RemoveTypeDescriptor {
        pub id: String,
    }
}
