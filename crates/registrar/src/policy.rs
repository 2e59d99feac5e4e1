use std::fmt;

use quick_xml::{
    Reader,
    events::{Event, attributes::AttrError},
};
use regex::{Regex, RegexBuilder};

/// Expiry granted when no table entry matches the user agent.
pub const DEFAULT_MAX_EXPIRY: u32 = 3600;

/// One per-user-agent override.
///
/// Some device firmwares mishandle a 200 OK that echoes the full binding
/// list, and some need their registration interval clamped; the table
/// records both quirks against a user-agent pattern.
#[derive(Debug)]
struct PolicyEntry {
    pattern: Regex,
    max_expiry: u32,
    contact_list_supported: bool,
}

/// The user-agent quirk table.
///
/// Built once from the configuration document, immutable afterwards.
/// Entries are evaluated in document order and the first match wins;
/// that ordering is part of the contract, so a catch-all pattern
/// belongs at the end.
#[derive(Debug, Default)]
pub struct UserAgentPolicy {
    entries: Vec<PolicyEntry>,
}

#[derive(Debug)]
pub enum PolicyError {
    Xml(quick_xml::Error),
    Attr(AttrError),
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml(e) => write!(f, "malformed user agent config: {}", e),
            Self::Attr(e) => write!(f, "malformed user agent attribute: {}", e),
        }
    }
}

impl std::error::Error for PolicyError {}

impl From<quick_xml::Error> for PolicyError {
    fn from(value: quick_xml::Error) -> Self {
        Self::Xml(value)
    }
}

impl From<AttrError> for PolicyError {
    fn from(value: AttrError) -> Self {
        Self::Attr(value)
    }
}

impl UserAgentPolicy {
    /// Parse the `<useragentconfigs>` document:
    ///
    /// ```xml
    /// <useragentconfigs>
    ///   <useragent expiry='113' contactlists='false' agent='fring'/>
    ///   <useragent expiry='3600' agent='.*'/>
    /// </useragentconfigs>
    /// ```
    ///
    /// `contactlists` defaults to true and `expiry` to 3600 when omitted.
    /// An entry whose pattern does not compile is skipped with a warning
    /// rather than failing the whole table.
    pub fn from_xml(xml: &str) -> Result<Self, PolicyError> {
        let mut reader = Reader::from_str(xml);
        let mut entries = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(element) | Event::Empty(element)
                    if element.name().as_ref() == b"useragent" =>
                {
                    let mut pattern = None;
                    let mut max_expiry = DEFAULT_MAX_EXPIRY;
                    let mut contact_list_supported = true;

                    for attribute in element.attributes() {
                        let attribute = attribute?;
                        let value = String::from_utf8_lossy(&attribute.value);
                        match attribute.key.as_ref() {
                            b"agent" => pattern = Some(value.into_owned()),
                            b"expiry" => {
                                max_expiry = value.trim().parse().unwrap_or(DEFAULT_MAX_EXPIRY)
                            }
                            b"contactlists" => {
                                contact_list_supported =
                                    !value.trim().eq_ignore_ascii_case("false")
                            }
                            _ => {}
                        }
                    }

                    let Some(pattern) = pattern else {
                        continue;
                    };

                    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                        Ok(regex) => entries.push(PolicyEntry {
                            pattern: regex,
                            max_expiry,
                            contact_list_supported,
                        }),
                        Err(e) => {
                            log::warn!(
                                "invalid user agent pattern skipped: pattern={:?}, error={}",
                                pattern,
                                e
                            );
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest registration expiry permitted for this user agent.
    pub fn max_expiry_for(&self, user_agent: &str) -> u32 {
        self.find(user_agent)
            .map(|entry| entry.max_expiry)
            .unwrap_or(DEFAULT_MAX_EXPIRY)
    }

    /// Whether a 200 OK to this user agent may echo the full binding
    /// list, or must repeat only the contact the device sent.
    pub fn contact_list_supported_for(&self, user_agent: &str) -> bool {
        self.find(user_agent)
            .map(|entry| entry.contact_list_supported)
            .unwrap_or(true)
    }

    fn find(&self, user_agent: &str) -> Option<&PolicyEntry> {
        self.entries
            .iter()
            .find(|entry| entry.pattern.is_match(user_agent))
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MAX_EXPIRY, UserAgentPolicy};

    #[test]
    fn test_single_entry() {
        let policy = UserAgentPolicy::from_xml(
            "<useragentconfigs>\
             <useragent expiry='3600' contactlists='false' agent='fring'/>\
             </useragentconfigs>",
        )
        .unwrap();

        assert_eq!(policy.len(), 1);
        assert_eq!(policy.max_expiry_for("fring"), 3600);
        assert!(!policy.contact_list_supported_for("fring"));
    }

    #[test]
    fn test_first_match_wins() {
        let policy = UserAgentPolicy::from_xml(
            "<useragentconfigs>\
             <useragent expiry='113' agent='fring'/>\
             <useragent expiry='3600' agent='fr.*'/>\
             </useragentconfigs>",
        )
        .unwrap();

        assert_eq!(policy.max_expiry_for("fring 1.0 (iphone)"), 113);
        assert_eq!(policy.max_expiry_for("freeswitch"), 3600);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let policy = UserAgentPolicy::from_xml(
            "<useragentconfigs><useragent expiry='600' agent='Hikvision'/></useragentconfigs>",
        )
        .unwrap();

        assert_eq!(policy.max_expiry_for("HIKVISION IPC v5"), 600);
    }

    #[test]
    fn test_defaults_without_match() {
        let policy = UserAgentPolicy::from_xml("<useragentconfigs/>").unwrap();

        assert!(policy.is_empty());
        assert_eq!(policy.max_expiry_for("anything"), DEFAULT_MAX_EXPIRY);
        assert!(policy.contact_list_supported_for("anything"));
    }

    #[test]
    fn test_omitted_attributes() {
        let policy = UserAgentPolicy::from_xml(
            "<useragentconfigs><useragent agent='cisco'/></useragentconfigs>",
        )
        .unwrap();

        assert_eq!(policy.max_expiry_for("cisco"), DEFAULT_MAX_EXPIRY);
        assert!(policy.contact_list_supported_for("cisco"));
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let policy = UserAgentPolicy::from_xml(
            "<useragentconfigs>\
             <useragent expiry='60' agent='('/>\
             <useragent expiry='600' agent='ok'/>\
             </useragentconfigs>",
        )
        .unwrap();

        assert_eq!(policy.len(), 1);
        assert_eq!(policy.max_expiry_for("ok"), 600);
    }
}
