//! Status helper enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data in the
//! corresponding `*_statuses` table. The wire name is the upper-case
//! label used by the API.

use serde::{Serialize, Serializer};

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a variant by database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Upper-case label, as seeded in the lookup table.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Analysis lifecycle of a Web.
    ///
    /// ```text
    /// PENDING --(trigger succeeds)--> PROCESSING --(success)--> COMPLETE
    /// PENDING --(trigger fails)-----> FAILED
    /// PROCESSING --(failure)--------> FAILED
    /// ```
    WebStatus {
        Pending = 1 => "PENDING",
        Processing = 2 => "PROCESSING",
        Complete = 3 => "COMPLETE",
        Failed = 4 => "FAILED",
    }
}

impl WebStatus {
    /// `COMPLETE` and `FAILED` accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// Whether the state machine allows `self -> next`.
    pub fn can_transition_to(self, next: WebStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending, Self::Failed)
                | (Self::Processing, Self::Complete)
                | (Self::Processing, Self::Failed)
        )
    }

    /// Statuses from which a transition to `next` is allowed.
    ///
    /// Used to build the guarded `WHERE status_id = ANY(...)` clause of
    /// compare-and-set updates.
    pub fn allowed_sources(next: WebStatus) -> Vec<StatusId> {
        [Self::Pending, Self::Processing, Self::Complete, Self::Failed]
            .into_iter()
            .filter(|from| from.can_transition_to(next))
            .map(WebStatus::id)
            .collect()
    }
}

/// Serialize a raw `status_id` column as its upper-case label.
pub fn serialize_web_status<S: Serializer>(id: &StatusId, serializer: S) -> Result<S::Ok, S::Error> {
    match WebStatus::from_id(*id) {
        Some(status) => status.serialize(serializer),
        None => serializer.serialize_i16(*id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_status_ids_match_seed_data() {
        assert_eq!(WebStatus::Pending.id(), 1);
        assert_eq!(WebStatus::Processing.id(), 2);
        assert_eq!(WebStatus::Complete.id(), 3);
        assert_eq!(WebStatus::Failed.id(), 4);
    }

    #[test]
    fn status_into_status_id() {
        let id: StatusId = WebStatus::Processing.into();
        assert_eq!(id, 2);
    }

    #[test]
    fn from_id_round_trips_and_rejects_unknown() {
        assert_eq!(WebStatus::from_id(3), Some(WebStatus::Complete));
        assert_eq!(WebStatus::from_id(0), None);
        assert_eq!(WebStatus::from_id(5), None);
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(
            serde_json::to_value(WebStatus::Processing).unwrap(),
            serde_json::json!("PROCESSING")
        );
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for next in [
            WebStatus::Pending,
            WebStatus::Processing,
            WebStatus::Complete,
            WebStatus::Failed,
        ] {
            assert!(!WebStatus::Complete.can_transition_to(next));
            assert!(!WebStatus::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn processing_never_returns_to_pending() {
        assert!(!WebStatus::Processing.can_transition_to(WebStatus::Pending));
    }

    #[test]
    fn allowed_sources_match_state_machine() {
        assert_eq!(WebStatus::allowed_sources(WebStatus::Processing), vec![1]);
        assert_eq!(WebStatus::allowed_sources(WebStatus::Complete), vec![2]);
        assert_eq!(WebStatus::allowed_sources(WebStatus::Failed), vec![1, 2]);
        assert!(WebStatus::allowed_sources(WebStatus::Pending).is_empty());
    }
}
