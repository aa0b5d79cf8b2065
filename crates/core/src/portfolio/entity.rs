use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::{Id, ValidationError, nullable, require_id, require_text};

// ============================================================
//  Team
// ============================================================

/// # Summary
/// 球队/板块实体，股票按球队归类。
///
/// # Invariants
/// - `name` 不可为空。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Team {
    pub id: Id,
    pub name: String,
}

/// 待持久化的新球队。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    name: String,
}

impl NewTeam {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: require_text("name", name)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// 球队可更新字段白名单。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeamPatch {
    pub name: Option<String>,
}

impl TeamPatch {
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: self.name.map(|n| require_text("name", &n)).transpose()?,
        })
    }
}

// ============================================================
//  Stock
// ============================================================

/// # Summary
/// 股票持有记录：某用户在某球队下持有的一份股票。
///
/// # Invariants
/// - `owner_id` 与 `team_id` 必须引用已存在的行，存储层通过外键保证。
/// - `transaction_id` 为空表示该股票不属于任何挂单交易。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Stock {
    pub id: Id,
    pub owner_id: Id,
    pub team_id: Id,
    pub transaction_id: Option<Id>,
}

/// 待持久化的新股票。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStock {
    owner_id: Id,
    team_id: Id,
    transaction_id: Option<Id>,
}

impl NewStock {
    pub fn new(
        owner_id: Id,
        team_id: Id,
        transaction_id: Option<Id>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            owner_id: require_id("owner_id", owner_id)?,
            team_id: require_id("team_id", team_id)?,
            transaction_id: transaction_id
                .map(|id| require_id("transaction_id", id))
                .transpose()?,
        })
    }

    pub fn owner_id(&self) -> Id {
        self.owner_id
    }

    pub fn team_id(&self) -> Id {
        self.team_id
    }

    pub fn transaction_id(&self) -> Option<Id> {
        self.transaction_id
    }
}

/// 股票可更新字段白名单。
///
/// `transaction_id` 区分三态：字段缺失不修改，`null` 解除与交易的关联，数值改挂到该交易。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StockPatch {
    pub owner_id: Option<Id>,
    pub team_id: Option<Id>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<i64>)]
    pub transaction_id: Option<Option<Id>>,
}

impl StockPatch {
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            owner_id: self
                .owner_id
                .map(|id| require_id("owner_id", id))
                .transpose()?,
            team_id: self.team_id.map(|id| require_id("team_id", id)).transpose()?,
            transaction_id: self
                .transaction_id
                .map(|tx| tx.map(|id| require_id("transaction_id", id)).transpose())
                .transpose()?,
        })
    }
}

// ============================================================
//  Transaction
// ============================================================

/// # Summary
/// 买卖双方之间的一笔交易，关联若干股票。
///
/// # Invariants
/// - `cost >= 0`。
/// - `expiry` 仅作为数据保存，不触发任何状态变化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: Id,
    pub seller_id: Id,
    pub buyer_id: Id,
    pub cost: i64,
    pub expiry: Option<DateTime<Utc>>,
}

/// 待持久化的新交易。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    seller_id: Id,
    buyer_id: Id,
    cost: i64,
    expiry: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn new(
        seller_id: Id,
        buyer_id: Id,
        cost: i64,
        expiry: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            seller_id: require_id("seller_id", seller_id)?,
            buyer_id: require_id("buyer_id", buyer_id)?,
            cost: require_cost(cost)?,
            expiry,
        })
    }

    pub fn seller_id(&self) -> Id {
        self.seller_id
    }

    pub fn buyer_id(&self) -> Id {
        self.buyer_id
    }

    pub fn cost(&self) -> i64 {
        self.cost
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }
}

/// 交易可更新字段白名单，`expiry: null` 清除过期时间。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TransactionPatch {
    pub seller_id: Option<Id>,
    pub buyer_id: Option<Id>,
    pub cost: Option<i64>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub expiry: Option<Option<DateTime<Utc>>>,
}

impl TransactionPatch {
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            seller_id: self
                .seller_id
                .map(|id| require_id("seller_id", id))
                .transpose()?,
            buyer_id: self
                .buyer_id
                .map(|id| require_id("buyer_id", id))
                .transpose()?,
            cost: self.cost.map(require_cost).transpose()?,
            expiry: self.expiry,
        })
    }
}

fn require_cost(cost: i64) -> Result<i64, ValidationError> {
    if cost < 0 {
        return Err(ValidationError::new("cost", "must not be negative"));
    }
    Ok(cost)
}
