use super::super::types::RrsigRecord;
use crate::dns::forwarding::record_type_map::RecordTypeMapper;
use hickory_proto::rr::Record;
use spark_dns_domain::RecordType;

/// The records sharing one owner and type, with the signatures covering them.
#[derive(Debug, Clone)]
pub struct SignedRrset {
    /// Lower-case, dot-terminated.
    pub owner: String,
    pub record_type: RecordType,
    pub records: Vec<Record>,
    pub rrsigs: Vec<RrsigRecord>,
}

impl SignedRrset {
    /// Signer of the first RRSIG, if any.
    pub fn signer(&self) -> Option<&str> {
        self.rrsigs.first().map(|rrsig| rrsig.signer_name.as_str())
    }
}

/// Splits a section into RRsets in order of first appearance. RRSIGs
/// are attached to the set they cover; signatures for sets that are not in
/// the section are dropped.
pub fn group_rrsets(records: &[Record]) -> Vec<SignedRrset> {
    let mut sets: Vec<SignedRrset> = Vec::new();
    let mut signatures: Vec<(String, RrsigRecord)> = Vec::new();

    for record in records {
        let owner = record.name().to_string().to_ascii_lowercase();
        if let Some(rrsig) = RrsigRecord::from_record(record) {
            signatures.push((owner, rrsig));
            continue;
        }

        let record_type = RecordTypeMapper::from_hickory(record.record_type());
        match sets
            .iter_mut()
            .find(|set| set.owner == owner && set.record_type == record_type)
        {
            Some(set) => set.records.push(record.clone()),
            None => sets.push(SignedRrset {
                owner,
                record_type,
                records: vec![record.clone()],
                rrsigs: Vec::new(),
            }),
        }
    }

    for (owner, rrsig) in signatures {
        if let Some(set) = sets
            .iter_mut()
            .find(|set| set.owner == owner && set.record_type == rrsig.type_covered)
        {
            set.rrsigs.push(rrsig);
        }
    }

    sets
}
