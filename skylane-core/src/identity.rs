use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Agent,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CUSTOMER" => Some(Role::Customer),
            "AGENT" => Some(Role::Agent),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Agent | Role::Admin)
    }
}

/// The authenticated principal behind a request, extracted from the identity
/// layer (out of scope here) before any engine operation runs.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn customer(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Customer,
        }
    }

    pub fn staff(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Owner of the resource, or staff acting on their behalf.
    pub fn can_act_for(&self, owner_id: Uuid) -> bool {
        self.role.is_staff() || self.user_id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_can_act_for_anyone() {
        let agent = Actor::staff(Uuid::new_v4(), Role::Agent);
        assert!(agent.can_act_for(Uuid::new_v4()));
    }

    #[test]
    fn customer_can_only_act_for_self() {
        let user_id = Uuid::new_v4();
        let customer = Actor::customer(user_id);
        assert!(customer.can_act_for(user_id));
        assert!(!customer.can_act_for(Uuid::new_v4()));
    }
}
