//! Anonymised profile hashing.
//!
//! Six coarse attributes are canonicalised as a JSON object with sorted keys
//! and `", "`/`": "` separators, then digested with SHA-256. The layout is
//! byte-compatible with the hashes already stored in the aggregate tables,
//! including the `\uXXXX` escaping of non-ASCII characters.

use std::io;

use serde::{Serialize, Serializer};
use serde_json::ser::Formatter;
use sha2::{Digest, Sha256};
use tripweaver_core::UserProfile;

const UNKNOWN: &str = "unknown";

/// Coarse attributes that identify a traveller cohort.
///
/// Fields are declared in key order so the serialised object is sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoarseProfile {
    /// Age bracket.
    pub age_group: String,
    /// Budget label (`low`, `medium`, `high`).
    pub budget_level: String,
    /// Party size; `None` is hashed as `"unknown"`.
    #[serde(serialize_with = "group_size_or_unknown")]
    pub group_size: Option<u32>,
    /// Pace label.
    pub pace: String,
    /// Travel style label.
    pub travel_style: String,
    /// Trip length bucket.
    pub trip_duration: String,
}

impl CoarseProfile {
    /// Reduce `profile` to its coarse attributes, filling defaults.
    ///
    /// An undeclared budget label is `medium` whatever the numeric tier.
    #[must_use]
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            age_group: profile.age_group.clone().unwrap_or_else(|| UNKNOWN.to_owned()),
            budget_level: profile.budget_level().to_owned(),
            group_size: profile.group_size,
            pace: profile.pace.as_str().to_owned(),
            travel_style: profile
                .travel_style()
                .unwrap_or(UNKNOWN)
                .to_owned(),
            trip_duration: profile
                .trip_duration
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_owned()),
        }
    }

    /// Canonical text that is fed to the digest.
    ///
    /// # Errors
    /// Returns [`serde_json::Error`] if serialisation fails.
    pub fn canonical(&self) -> Result<String, serde_json::Error> {
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, CanonicalFormatter);
        self.serialize(&mut serializer)?;
        // The formatter only emits ASCII.
        Ok(out.into_iter().map(char::from).collect())
    }

    /// SHA-256 hex digest of [`Self::canonical`].
    ///
    /// # Errors
    /// Returns [`serde_json::Error`] if canonicalisation fails.
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let canonical = self.canonical()?;
        Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
    }
}

/// Anonymised hash for `profile`.
///
/// # Errors
/// Returns [`serde_json::Error`] if the coarse profile cannot be
/// canonicalised.
///
/// # Examples
/// ```
/// use tripweaver_collective::profile_hash;
/// use tripweaver_core::UserProfile;
///
/// let hash = profile_hash(&UserProfile::default())?;
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, profile_hash(&UserProfile::default())?);
/// # Ok::<(), serde_json::Error>(())
/// ```
pub fn profile_hash(profile: &UserProfile) -> Result<String, serde_json::Error> {
    CoarseProfile::from_profile(profile).digest()
}

fn group_size_or_unknown<S: Serializer>(
    size: &Option<u32>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match size {
        Some(size) => serializer.serialize_u32(*size),
        None => serializer.serialize_str(UNKNOWN),
    }
}

/// Compact JSON with `", "` and `": "` separators and ASCII-only strings.
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch == ' ' || ch.is_ascii_graphic() {
                let mut buf = [0u8; 1];
                writer.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}
