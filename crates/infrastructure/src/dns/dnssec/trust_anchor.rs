use super::crypto::SignatureVerifier;
use super::types::{DnskeyRecord, DsRecord};
use super::validation::chain::normalize_name;
use base64::{engine::general_purpose::STANDARD, Engine};
use spark_dns_domain::DomainError;
use std::path::Path;
use tracing::{debug, warn};

/// Root KSK-2010.
const ROOT_KSK_19036: &str = ". IN DNSKEY 257 3 8 ( \
    AwEAAagAIKlVZrpC6Ia7gEzahOR+9W29euxhJhVVLOyQbSEW0O8gcCjF \
    FVQUTf6v58fLjwBd0YI0EzrAcQqBGCzh/RStIoO8g0NfnfL2MTJRkxoX \
    bfDaUeVPQuYEhg37NZWAJQ9VnMVDxP/VHL496M/QZxkjf5/Efucp2gaD \
    X6RS6CXpoY68LsvPVjR0ZSwzz1apAzvN9dlzEheX7ICJBBtuA6G3LQpz \
    W5hOA2hzCTMjJPJ8LbqF6dsV6DoBQzgul0sGIcGOYl7OyQdXfZ57relS \
    Qageu+ipAdTTJ25AsRTAoub8ONGcLmqrAmRLKBP1dfwhYB4N7knNnulq \
    QxA+Uk1ihz0= ) ; KSK-2010";

/// Root KSK-2017.
const ROOT_KSK_20326: &str = ". IN DNSKEY 257 3 8 ( \
    AwEAAaz/tAm8yTn4Mfeh5eyI96WSVexTBAvkMgJzkKTOiW1vkIbzxeF3 \
    +/4RgWOq7HrxRixHlFlExOLAJr5emLvN7SWXgnLh4+B5xQlNVz8Og8kv \
    ArMtNROxVQuCaSnIDdD5LKyWbRd2n9WGe2R8PzgCmr3EgVLrjyBxWezF \
    0jLHwVN8efS3rCj/EWgvIWgb9tarpVUDK/b58Da+sqqls3eNbuv7pr+e \
    oZG+SrDK6nWeL3c6H5Apxz7LjVc1uTIdsIXxuOLYA4/ilBmSVIzuDWfd \
    RUfhHdY6+cn8HFRm+2hM8AnXGXws9555KrUB5qihylGa8subX2Nn6UwN \
    R1AkUTV74bU= ) ; KSK-2017";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorKey {
    Dnskey(DnskeyRecord),
    Ds(DsRecord),
}

#[derive(Debug, Clone)]
pub struct TrustAnchor {
    /// Lower-case, dot-terminated.
    pub domain: String,

    pub key: AnchorKey,

    pub description: String,
}

impl TrustAnchor {
    pub fn new(domain: &str, key: AnchorKey, description: String) -> Self {
        Self {
            domain: normalize_name(domain),
            key,
            description,
        }
    }

    /// Parses one `owner [ttl] [class] DNSKEY|DS ...` record. Comments and
    /// parentheses must already be stripped.
    pub fn from_presentation(record: &str) -> Result<Self, DomainError> {
        let invalid = |reason: &str| {
            DomainError::Config(format!("invalid trust anchor '{}': {}", record.trim(), reason))
        };

        let mut tokens = record.split_whitespace();
        let owner = tokens.next().ok_or_else(|| invalid("empty record"))?;

        let rtype = loop {
            let token = tokens.next().ok_or_else(|| invalid("missing record type"))?;
            let is_ttl = token.chars().all(|c| c.is_ascii_digit());
            let is_class = token.eq_ignore_ascii_case("IN");
            if !is_ttl && !is_class {
                break token.to_ascii_uppercase();
            }
        };

        let mut field = |name: &str| {
            tokens
                .next()
                .ok_or_else(|| invalid(&format!("missing {}", name)))
        };

        let key = match rtype.as_str() {
            "DNSKEY" => {
                let flags = field("flags")?.parse::<u16>().map_err(|_| invalid("bad flags"))?;
                let protocol = field("protocol")?
                    .parse::<u8>()
                    .map_err(|_| invalid("bad protocol"))?;
                let algorithm = field("algorithm")?
                    .parse::<u8>()
                    .map_err(|_| invalid("bad algorithm"))?;
                let key_text: String = tokens.collect();
                let public_key = STANDARD
                    .decode(key_text.as_bytes())
                    .map_err(|e| invalid(&format!("bad base64 key: {}", e)))?;
                if protocol != 3 {
                    return Err(invalid("protocol must be 3"));
                }
                AnchorKey::Dnskey(DnskeyRecord::new(flags, algorithm, public_key))
            }
            "DS" => {
                let key_tag = field("key tag")?
                    .parse::<u16>()
                    .map_err(|_| invalid("bad key tag"))?;
                let algorithm = field("algorithm")?
                    .parse::<u8>()
                    .map_err(|_| invalid("bad algorithm"))?;
                let digest_type = field("digest type")?
                    .parse::<u8>()
                    .map_err(|_| invalid("bad digest type"))?;
                let digest_text: String = tokens.collect();
                let digest = decode_hex(&digest_text).ok_or_else(|| invalid("bad hex digest"))?;
                let ds = DsRecord::new(key_tag, algorithm, digest_type, digest)
                    .map_err(|e| invalid(&e.to_string()))?;
                AnchorKey::Ds(ds)
            }
            other => return Err(invalid(&format!("unsupported type {}", other))),
        };

        let description = match &key {
            AnchorKey::Dnskey(dnskey) => format!("DNSKEY {}", dnskey.calculate_key_tag()),
            AnchorKey::Ds(ds) => format!("DS {}", ds.key_tag),
        };
        Ok(Self::new(owner, key, description))
    }

    pub fn matches(&self, dnskey: &DnskeyRecord) -> bool {
        match &self.key {
            AnchorKey::Dnskey(anchor) => {
                anchor.calculate_key_tag() == dnskey.calculate_key_tag()
                    && anchor.algorithm == dnskey.algorithm
                    && anchor.public_key == dnskey.public_key
            }
            AnchorKey::Ds(ds) => SignatureVerifier
                .verify_ds(ds, dnskey, &self.domain)
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrustAnchorStore {
    anchors: Vec<TrustAnchor>,
}

impl TrustAnchorStore {
    /// Store holding the built-in root keys.
    pub fn new() -> Self {
        Self {
            anchors: Self::default_root_anchors(),
        }
    }

    pub fn empty() -> Self {
        Self {
            anchors: Vec::new(),
        }
    }

    pub fn default_root_anchors() -> Vec<TrustAnchor> {
        [ROOT_KSK_19036, ROOT_KSK_20326]
            .iter()
            .flat_map(|text| parse_records(text))
            .filter_map(|record| match TrustAnchor::from_presentation(&record) {
                Ok(anchor) => Some(anchor),
                Err(e) => {
                    warn!(error = %e, "Built-in trust anchor rejected");
                    None
                }
            })
            .collect()
    }

    pub fn add_anchor(&mut self, anchor: TrustAnchor) {
        debug!(domain = %anchor.domain, anchor = %anchor.description, "Trust anchor added");
        self.anchors.push(anchor);
    }

    /// Adds every record in zone-file text. Returns how many were added.
    pub fn add_from_text(&mut self, text: &str) -> Result<usize, DomainError> {
        let anchors = parse_records(text)
            .iter()
            .map(|record| TrustAnchor::from_presentation(record))
            .collect::<Result<Vec<_>, _>>()?;

        let count = anchors.len();
        for anchor in anchors {
            self.add_anchor(anchor);
        }
        Ok(count)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, DomainError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Config(format!("cannot read trust anchor file {}: {}", path.display(), e))
        })?;
        self.add_from_text(&text)
    }

    pub fn is_trusted(&self, dnskey: &DnskeyRecord, domain: &str) -> bool {
        let domain = normalize_name(domain);
        self.anchors
            .iter()
            .any(|anchor| anchor.domain == domain && anchor.matches(dnskey))
    }

    /// `domain` must already be normalized.
    pub fn anchors_for<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = &'a TrustAnchor> + 'a {
        self.anchors.iter().filter(move |anchor| anchor.domain == domain)
    }

    pub fn get_all_anchors(&self) -> &[TrustAnchor] {
        &self.anchors
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

impl Default for TrustAnchorStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits zone-file text into single-line records: `;` comments are
/// dropped and parenthesised continuations joined.
fn parse_records(text: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;

    for line in text.lines() {
        let line = line.split(';').next().unwrap_or("");
        for c in line.chars() {
            match c {
                '(' => {
                    depth += 1;
                    current.push(' ');
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(' ');
                }
                _ => current.push(c),
            }
        }
        current.push(' ');

        if depth == 0 && !current.trim().is_empty() {
            records.push(current.trim().to_string());
            current.clear();
        } else if depth == 0 {
            current.clear();
        }
    }

    if !current.trim().is_empty() {
        records.push(current.trim().to_string());
    }
    records
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
        .collect()
}
