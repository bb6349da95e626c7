use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize};

/// Geometry of a scored bubble in binarized-column coordinates, along with
/// the column's own dimensions so callers can map the box back into the
/// original image.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleBounds {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
    pub crop_origin_w: u32,
    pub crop_origin_h: u32,
}

/// The winning bubble of a row. `label` is the 1-based bubble number.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkedBubble {
    pub label: u32,
    #[serde(rename = "box")]
    pub bounds: BubbleBounds,
}

/// Outcome for a single answer row: either no confident mark, or exactly one
/// winning bubble. Serialized as a 0- or 1-element array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowResult(Option<MarkedBubble>);

impl RowResult {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn marked(bubble: MarkedBubble) -> Self {
        Self(Some(bubble))
    }

    pub fn mark(&self) -> Option<&MarkedBubble> {
        self.0.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl Serialize for RowResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(usize::from(self.0.is_some())))?;
        if let Some(mark) = &self.0 {
            seq.serialize_element(mark)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for RowResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let mut marks = Vec::<MarkedBubble>::deserialize(deserializer)?;
        match marks.len() {
            0 | 1 => Ok(Self(marks.pop())),
            n => Err(serde::de::Error::invalid_length(n, &"at most one mark per row")),
        }
    }
}

// Defines a new type that wraps a String for use as an ID.
macro_rules! idtype {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            #[allow(dead_code)]
            pub fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use idtype;
