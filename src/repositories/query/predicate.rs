//! # 조회 조건(Predicate) 구현
//!
//! 스토어가 사용하는 닫힌 집합의 조회 형태를 표현하고,
//! MongoDB 필터 문서로 변환하거나 메모리 엔진에서 직접 평가합니다.
//!
//! ## 지원 형태
//!
//! | 형태 | MongoDB 필터 |
//! |------|--------------|
//! | `All` | `{}` |
//! | `Equals` | `{ field: value }` |
//! | `ElementMatch` | `{ array: { $elemMatch: { f1: v1, f2: v2 } } }` |
//!
//! 모든 비교는 대소문자를 구분하는 정확한 문자열 비교입니다. 정규화는 호출자의 몫입니다.
//! 정렬 단계나 결과 개수 제한은 추가하지 않으므로 결과는 컬렉션의 저장 순서를 따릅니다.

use mongodb::bson::{Bson, Document as BsonDocument, doc};

use crate::domain::entities::Claim;

/// 사용자 문서 필드
pub mod user_fields {
    pub const NORMALIZED_USER_NAME: &str = "normalizedUserName";
    pub const NORMALIZED_EMAIL: &str = "normalizedEmail";
    pub const CLAIMS: &str = "claims";
    pub const CLAIM_TYPE: &str = "type";
    pub const CLAIM_VALUE: &str = "value";
    pub const LOGINS: &str = "logins";
    pub const LOGIN_PROVIDER: &str = "loginProvider";
    pub const PROVIDER_KEY: &str = "providerKey";
    pub const ROLES: &str = "roles";
    pub const ROLE_NAME: &str = "roleName";
}

/// 역할 문서 필드
pub mod role_fields {
    pub const NORMALIZED_NAME: &str = "normalizedName";
}

/// 문서 필터 조건
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// 모든 문서
    All,
    /// 최상위 스칼라 문자열 필드가 값과 같음
    Equals { field: &'static str, value: String },
    /// 배열 필드에 나열된 하위 필드가 모두 일치하는 원소가 하나 이상 존재
    ElementMatch {
        array: &'static str,
        fields: Vec<(&'static str, String)>,
    },
}

impl Predicate {
    pub fn by_normalized_user_name(value: impl Into<String>) -> Self {
        Predicate::Equals {
            field: user_fields::NORMALIZED_USER_NAME,
            value: value.into(),
        }
    }

    pub fn by_normalized_email(value: impl Into<String>) -> Self {
        Predicate::Equals {
            field: user_fields::NORMALIZED_EMAIL,
            value: value.into(),
        }
    }

    /// 같은 로그인 항목 안에서 프로바이더와 키가 모두 일치
    pub fn by_login(login_provider: impl Into<String>, provider_key: impl Into<String>) -> Self {
        Predicate::ElementMatch {
            array: user_fields::LOGINS,
            fields: vec![
                (user_fields::LOGIN_PROVIDER, login_provider.into()),
                (user_fields::PROVIDER_KEY, provider_key.into()),
            ],
        }
    }

    /// 같은 클레임 항목 안에서 타입과 값이 모두 일치
    pub fn by_claim(claim: &Claim) -> Self {
        Predicate::ElementMatch {
            array: user_fields::CLAIMS,
            fields: vec![
                (user_fields::CLAIM_TYPE, claim.claim_type.clone()),
                (user_fields::CLAIM_VALUE, claim.value.clone()),
            ],
        }
    }

    /// 역할 스냅샷 중 하나의 이름이 일치
    pub fn by_role_name(role_name: impl Into<String>) -> Self {
        Predicate::ElementMatch {
            array: user_fields::ROLES,
            fields: vec![(user_fields::ROLE_NAME, role_name.into())],
        }
    }

    pub fn by_normalized_role_name(value: impl Into<String>) -> Self {
        Predicate::Equals {
            field: role_fields::NORMALIZED_NAME,
            value: value.into(),
        }
    }

    /// MongoDB 필터 문서로 변환
    pub fn to_filter(&self) -> BsonDocument {
        let mut filter = BsonDocument::new();

        match self {
            Predicate::All => {}
            Predicate::Equals { field, value } => {
                filter.insert(*field, value.as_str());
            }
            Predicate::ElementMatch { array, fields } => {
                let mut element = BsonDocument::new();
                for (field, value) in fields {
                    element.insert(*field, value.as_str());
                }
                filter.insert(*array, doc! { "$elemMatch": element });
            }
        }

        filter
    }

    /// 메모리 상의 문서에 대해 조건을 평가
    ///
    /// `to_filter()`가 만드는 MongoDB 필터와 같은 의미를 가집니다.
    /// 필드가 없거나 문자열이 아니면 일치하지 않습니다.
    pub fn matches(&self, document: &BsonDocument) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Equals { field, value } => string_field_equals(document, field, value),
            Predicate::ElementMatch { array, fields } => match document.get(*array) {
                Some(Bson::Array(elements)) => elements.iter().any(|element| match element {
                    Bson::Document(element) => fields
                        .iter()
                        .all(|(field, value)| string_field_equals(element, field, value)),
                    _ => false,
                }),
                _ => false,
            },
        }
    }
}

fn string_field_equals(document: &BsonDocument, field: &str, expected: &str) -> bool {
    matches!(document.get(field), Some(Bson::String(actual)) if actual == expected)
}
