//! Mapping between `spark_dns_domain::RecordType` and `hickory_proto::rr::RecordType`.
//!
//! Both sides keep the numeric code for types they do not name, so the
//! conversion goes through the IANA value and never fails.

use hickory_proto::rr::RecordType as HickoryRecordType;
use spark_dns_domain::RecordType;

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    pub fn to_hickory(record_type: &RecordType) -> HickoryRecordType {
        HickoryRecordType::from(record_type.to_u16())
    }

    pub fn from_hickory(hickory_type: HickoryRecordType) -> RecordType {
        RecordType::from_u16(u16::from(hickory_type))
    }
}
