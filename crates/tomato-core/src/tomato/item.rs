use serde::{Deserialize, Serialize};

/// Progress state of a single tomato slot.
///
/// ```text
/// Locked -> Available -> Done
///               ^          |
///               +----------+  (restart)
/// ```
///
/// Transitions are applied only by [`crate::tomato::progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TomatoState {
    Locked,
    Available,
    Done,
}

impl TomatoState {
    pub fn is_done(&self) -> bool {
        matches!(self, TomatoState::Done)
    }
}

/// One 25-minute focus-session slot inside a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomatoItem {
    pub(crate) id: u32,
    pub(crate) state: TomatoState,
    /// Opaque image bytes picked by the user, stored as base64.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "photo_base64"
    )]
    pub(crate) photo: Option<Vec<u8>>,
}

impl TomatoItem {
    pub(crate) fn new(id: u32, state: TomatoState) -> Self {
        Self {
            id,
            state,
            photo: None,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn state(&self) -> TomatoState {
        self.state
    }

    pub fn photo(&self) -> Option<&[u8]> {
        self.photo.as_deref()
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }
}

mod photo_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(photo: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match photo {
            Some(bytes) => s.serialize_some(&STANDARD.encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|encoded| STANDARD.decode(encoded).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_serializes_lowercase() {
        let json = serde_json::to_string(&TomatoState::Available).unwrap();
        assert_eq!(json, "\"available\"");
    }

    #[test]
    fn photo_is_base64_on_the_wire() {
        let mut item = TomatoItem::new(1, TomatoState::Done);
        item.photo = Some(vec![0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["photo"], "3q2+7w==");

        let back: TomatoItem = serde_json::from_value(json).unwrap();
        assert_eq!(back.photo(), Some(&[0xde, 0xad, 0xbe, 0xef][..]));
    }

    #[test]
    fn missing_photo_is_omitted_and_accepted() {
        let item = TomatoItem::new(2, TomatoState::Locked);
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("photo"));

        let back: TomatoItem = serde_json::from_str(r#"{"id":2,"state":"locked"}"#).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let result: Result<TomatoItem, _> =
            serde_json::from_str(r#"{"id":1,"state":"done","photo":"***"}"#);
        assert!(result.is_err());
    }
}
