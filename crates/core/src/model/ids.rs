use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error type for parsing an ID from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wraps an existing UUID.
            #[must_use]
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// Generates a fresh random ID.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub fn value(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<Uuid>().map($name::new).map_err(|_| ParseIdError {
                    kind: stringify!($name),
                })
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a User.
    UserId
}
uuid_id! {
    /// Unique identifier for a Course.
    CourseId
}
uuid_id! {
    /// Unique identifier for a Quiz.
    QuizId
}
uuid_id! {
    /// Unique identifier for a course Resource.
    ResourceId
}
uuid_id! {
    /// Unique identifier for a quiz Submission.
    SubmissionId
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "2d9f3c6e-8a41-4f0b-9c1d-5e7a2b3c4d5f";

    #[test]
    fn course_id_roundtrips_through_string() {
        let id: CourseId = SAMPLE.parse().unwrap();
        assert_eq!(id.to_string(), SAMPLE);
        assert_eq!(id, CourseId::new(SAMPLE.parse().unwrap()));
    }

    #[test]
    fn user_id_rejects_garbage() {
        let result = "not-a-uuid".parse::<UserId>();
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "failed to parse UserId from string"
        );
    }

    #[test]
    fn random_ids_are_distinct() {
        assert_ne!(QuizId::random(), QuizId::random());
    }

    #[test]
    fn debug_includes_kind() {
        let id: SubmissionId = SAMPLE.parse().unwrap();
        assert!(format!("{id:?}").starts_with("SubmissionId("));
    }
}
