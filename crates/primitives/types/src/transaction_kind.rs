use crate::KeyParseError;

/// Transaction types addressable through the `/transactions/.../type/:type`
/// routes, mapped to their u16 wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Transfer,
    RegisterNamespace,
    AddressAlias,
    MosaicAlias,
    MosaicDefinition,
    MosaicSupplyChange,
    ModifyMultisigAccount,
    AggregateComplete,
    AggregateBonded,
    HashLock,
    SecretLock,
    SecretProof,
}

impl TransactionKind {
    pub fn from_route_name(name: &str) -> Result<Self, KeyParseError> {
        match name {
            "transfer" => Ok(Self::Transfer),
            "registerNamespace" => Ok(Self::RegisterNamespace),
            "addressAlias" => Ok(Self::AddressAlias),
            "mosaicAlias" => Ok(Self::MosaicAlias),
            "mosaicDefinition" => Ok(Self::MosaicDefinition),
            "mosaicSupplyChange" => Ok(Self::MosaicSupplyChange),
            "modifyMultisigAccount" => Ok(Self::ModifyMultisigAccount),
            "aggregateComplete" => Ok(Self::AggregateComplete),
            "aggregateBonded" => Ok(Self::AggregateBonded),
            "hashLock" => Ok(Self::HashLock),
            "secretLock" => Ok(Self::SecretLock),
            "secretProof" => Ok(Self::SecretProof),
            other => Err(KeyParseError::UnknownTransactionType(other.to_string())),
        }
    }

    pub fn route_name(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::RegisterNamespace => "registerNamespace",
            Self::AddressAlias => "addressAlias",
            Self::MosaicAlias => "mosaicAlias",
            Self::MosaicDefinition => "mosaicDefinition",
            Self::MosaicSupplyChange => "mosaicSupplyChange",
            Self::ModifyMultisigAccount => "modifyMultisigAccount",
            Self::AggregateComplete => "aggregateComplete",
            Self::AggregateBonded => "aggregateBonded",
            Self::HashLock => "hashLock",
            Self::SecretLock => "secretLock",
            Self::SecretProof => "secretProof",
        }
    }

    /// The `transaction.type` wire code stored in documents.
    pub fn code(&self) -> u16 {
        match self {
            Self::Transfer => 0x4154,
            Self::RegisterNamespace => 0x414E,
            Self::AddressAlias => 0x424E,
            Self::MosaicAlias => 0x434E,
            Self::MosaicDefinition => 0x414D,
            Self::MosaicSupplyChange => 0x424D,
            Self::ModifyMultisigAccount => 0x4155,
            Self::AggregateComplete => 0x4141,
            Self::AggregateBonded => 0x4241,
            Self::HashLock => 0x4148,
            Self::SecretLock => 0x4152,
            Self::SecretProof => 0x4252,
        }
    }
}

/// Secondary filter accepted by the transfer type routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFilter {
    /// Transfers carrying at least one mosaic other than the two well-known
    /// network mosaics.
    Mosaic,
    /// Transfers touching at least one multisig account.
    Multisig,
}

impl TransferFilter {
    pub fn route_name(&self) -> &'static str {
        match self {
            Self::Mosaic => "mosaic",
            Self::Multisig => "multisig",
        }
    }

    pub fn from_route_name(name: &str) -> Result<Self, KeyParseError> {
        match name {
            "mosaic" => Ok(Self::Mosaic),
            "multisig" => Ok(Self::Multisig),
            other => Err(KeyParseError::UnknownTransferFilter(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("transfer", TransactionKind::Transfer, 0x4154)]
    #[case("aggregateBonded", TransactionKind::AggregateBonded, 0x4241)]
    #[case("registerNamespace", TransactionKind::RegisterNamespace, 0x414E)]
    fn route_names_resolve(#[case] name: &str, #[case] kind: TransactionKind, #[case] code: u16) {
        assert_eq!(TransactionKind::from_route_name(name), Ok(kind));
        assert_eq!(kind.code(), code);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            TransactionKind::from_route_name("Transfer"),
            Err(KeyParseError::UnknownTransactionType("Transfer".into()))
        );
        assert_eq!(
            TransferFilter::from_route_name("mosaics"),
            Err(KeyParseError::UnknownTransferFilter("mosaics".into()))
        );
    }
}
