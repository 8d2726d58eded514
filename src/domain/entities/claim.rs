use serde::{Deserialize, Serialize};

/// 타입/값 쌍으로 이루어진 클레임
///
/// 사용자와 역할 문서 모두에 내장됩니다. 두 클레임은 타입과 값이 모두 같을 때
/// 같은 클레임으로 취급합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}
