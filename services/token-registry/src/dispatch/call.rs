//! Decoded calls.

use dip721_interface::{
    CallResult, Dip721, GenericValue, Nat, Operation, Principal, PropertyBag, TokenIdentifier,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::RegistryError;

/// A call with its arguments decoded into Rust values.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `metadata`
    Metadata,
    /// `stats`
    Stats,
    /// `logo`
    Logo,
    /// `set_logo`
    SetLogo(String),
    /// `name`
    Name,
    /// `set_name`
    SetName(String),
    /// `symbol`
    Symbol,
    /// `set_symbol`
    SetSymbol(String),
    /// `custodians`
    Custodians,
    /// `set_custodians`
    SetCustodians(Vec<Principal>),
    /// `cycles`
    Cycles,
    /// `total_unique_holders`
    TotalUniqueHolders,
    /// `token_metadata`
    TokenMetadata(TokenIdentifier),
    /// `balance_of`
    BalanceOf(Principal),
    /// `owner_of`
    OwnerOf(TokenIdentifier),
    /// `owner_token_identifiers`
    OwnerTokenIdentifiers(Principal),
    /// `owner_token_metadata`
    OwnerTokenMetadata(Principal),
    /// `operator_of`
    OperatorOf(TokenIdentifier),
    /// `operator_token_identifiers`
    OperatorTokenIdentifiers(Principal),
    /// `operator_token_metadata`
    OperatorTokenMetadata(Principal),
    /// `supported_interfaces`
    SupportedInterfaces,
    /// `total_supply`
    TotalSupply,
    /// `approve`
    Approve {
        /// New operator
        operator: Principal,
        /// Target token
        token_identifier: TokenIdentifier,
    },
    /// `set_approval_for_all`
    SetApprovalForAll {
        /// Operator granted or revoked
        operator: Principal,
        /// Grant when true
        approved: bool,
    },
    /// `is_approved_for_all`
    IsApprovedForAll {
        /// Token owner
        owner: Principal,
        /// Operator checked
        operator: Principal,
    },
    /// `transfer`
    Transfer {
        /// Recipient
        to: Principal,
        /// Target token
        token_identifier: TokenIdentifier,
    },
    /// `transfer_from`
    TransferFrom {
        /// Current owner
        from: Principal,
        /// Recipient
        to: Principal,
        /// Target token
        token_identifier: TokenIdentifier,
    },
    /// `mint`
    Mint {
        /// First owner
        to: Principal,
        /// New token
        token_identifier: TokenIdentifier,
        /// Initial properties
        properties: PropertyBag,
    },
    /// `burn`
    Burn(TokenIdentifier),
    /// `transaction`
    Transaction(Nat),
    /// `total_transactions`
    TotalTransactions,
    /// `set_token_property`
    SetTokenProperty {
        /// Target token
        token_identifier: TokenIdentifier,
        /// Property name
        key: String,
        /// Property value
        value: GenericValue,
    },
}

struct Args<'a>(&'a [Value]);

impl Args<'_> {
    fn get<T: DeserializeOwned>(&self, index: usize) -> Result<T, RegistryError> {
        let Some(value) = self.0.get(index) else {
            let detail = format!("missing argument {}", index);
            return Err(RegistryError::invalid_arguments(detail));
        };
        T::deserialize(value).map_err(|e| {
            let detail = format!("argument {}: {}", index, e);
            RegistryError::invalid_arguments(detail)
        })
    }
}

fn reply<T: Serialize>(value: T) -> Result<Vec<Value>, RegistryError> {
    Ok(vec![serde_json::to_value(value)?])
}

fn unit(result: CallResult<()>) -> CallResult<Result<Vec<Value>, RegistryError>> {
    result.map(|()| Ok(Vec::new()))
}

impl Call {
    /// Decode the positional JSON arguments of `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArguments`] if an argument is missing
    /// or has the wrong shape.
    pub fn decode(operation: Operation, args: &[Value]) -> Result<Self, RegistryError> {
        let args = Args(args);
        Ok(match operation {
            Operation::Metadata => Self::Metadata,
            Operation::Stats => Self::Stats,
            Operation::Logo => Self::Logo,
            Operation::SetLogo => Self::SetLogo(args.get(0)?),
            Operation::Name => Self::Name,
            Operation::SetName => Self::SetName(args.get(0)?),
            Operation::Symbol => Self::Symbol,
            Operation::SetSymbol => Self::SetSymbol(args.get(0)?),
            Operation::Custodians => Self::Custodians,
            Operation::SetCustodians => Self::SetCustodians(args.get(0)?),
            Operation::Cycles => Self::Cycles,
            Operation::TotalUniqueHolders => Self::TotalUniqueHolders,
            Operation::TokenMetadata => Self::TokenMetadata(args.get(0)?),
            Operation::BalanceOf => Self::BalanceOf(args.get(0)?),
            Operation::OwnerOf => Self::OwnerOf(args.get(0)?),
            Operation::OwnerTokenIdentifiers => Self::OwnerTokenIdentifiers(args.get(0)?),
            Operation::OwnerTokenMetadata => Self::OwnerTokenMetadata(args.get(0)?),
            Operation::OperatorOf => Self::OperatorOf(args.get(0)?),
            Operation::OperatorTokenIdentifiers => Self::OperatorTokenIdentifiers(args.get(0)?),
            Operation::OperatorTokenMetadata => Self::OperatorTokenMetadata(args.get(0)?),
            Operation::SupportedInterfaces => Self::SupportedInterfaces,
            Operation::TotalSupply => Self::TotalSupply,
            Operation::Approve => Self::Approve {
                operator: args.get(0)?,
                token_identifier: args.get(1)?,
            },
            Operation::SetApprovalForAll => Self::SetApprovalForAll {
                operator: args.get(0)?,
                approved: args.get(1)?,
            },
            Operation::IsApprovedForAll => Self::IsApprovedForAll {
                owner: args.get(0)?,
                operator: args.get(1)?,
            },
            Operation::Transfer => Self::Transfer {
                to: args.get(0)?,
                token_identifier: args.get(1)?,
            },
            Operation::TransferFrom => Self::TransferFrom {
                from: args.get(0)?,
                to: args.get(1)?,
                token_identifier: args.get(2)?,
            },
            Operation::Mint => Self::Mint {
                to: args.get(0)?,
                token_identifier: args.get(1)?,
                properties: args.get(2)?,
            },
            Operation::Burn => Self::Burn(args.get(0)?),
            Operation::Transaction => Self::Transaction(args.get(0)?),
            Operation::TotalTransactions => Self::TotalTransactions,
            Operation::SetTokenProperty => Self::SetTokenProperty {
                token_identifier: args.get(0)?,
                key: args.get(1)?,
                value: args.get(2)?,
            },
        })
    }

    /// Token the call acts on, for calls guarded per token.
    #[must_use]
    pub fn token_identifier(&self) -> Option<&TokenIdentifier> {
        match self {
            Self::Approve {
                token_identifier, ..
            }
            | Self::Transfer {
                token_identifier, ..
            }
            | Self::TransferFrom {
                token_identifier, ..
            }
            | Self::Mint {
                token_identifier, ..
            }
            | Self::SetTokenProperty {
                token_identifier, ..
            }
            | Self::Burn(token_identifier) => Some(token_identifier),
            _ => None,
        }
    }

    /// Run the call against `service` on behalf of `caller`.
    ///
    /// The outer result is the call-level rejection; the inner one carries
    /// reply encoding failures.
    pub async fn execute<S>(
        self,
        service: &S,
        caller: Principal,
    ) -> CallResult<Result<Vec<Value>, RegistryError>>
    where
        S: Dip721 + ?Sized,
    {
        Ok(match self {
            Self::Metadata => reply(service.metadata().await),
            Self::Stats => reply(service.stats().await),
            Self::Logo => reply(service.logo().await),
            Self::SetLogo(logo) => return unit(service.set_logo(caller, logo).await),
            Self::Name => reply(service.name().await),
            Self::SetName(name) => return unit(service.set_name(caller, name).await),
            Self::Symbol => reply(service.symbol().await),
            Self::SetSymbol(symbol) => return unit(service.set_symbol(caller, symbol).await),
            Self::Custodians => reply(service.custodians().await),
            Self::SetCustodians(custodians) => {
                return unit(service.set_custodians(caller, custodians).await);
            }
            Self::Cycles => reply(service.cycles().await),
            Self::TotalUniqueHolders => reply(service.total_unique_holders().await),
            Self::TokenMetadata(id) => reply(service.token_metadata(id).await),
            Self::BalanceOf(owner) => reply(service.balance_of(owner).await),
            Self::OwnerOf(id) => reply(service.owner_of(id).await),
            Self::OwnerTokenIdentifiers(owner) => {
                reply(service.owner_token_identifiers(owner).await)
            }
            Self::OwnerTokenMetadata(owner) => reply(service.owner_token_metadata(owner).await),
            Self::OperatorOf(id) => reply(service.operator_of(id).await),
            Self::OperatorTokenIdentifiers(operator) => {
                reply(service.operator_token_identifiers(operator).await)
            }
            Self::OperatorTokenMetadata(operator) => {
                reply(service.operator_token_metadata(operator).await)
            }
            Self::SupportedInterfaces => reply(service.supported_interfaces().await),
            Self::TotalSupply => reply(service.total_supply().await),
            Self::Approve {
                operator,
                token_identifier,
            } => reply(service.approve(caller, operator, token_identifier).await),
            Self::SetApprovalForAll { operator, approved } => reply(
                service
                    .set_approval_for_all(caller, operator, approved)
                    .await,
            ),
            Self::IsApprovedForAll { owner, operator } => {
                reply(service.is_approved_for_all(owner, operator).await)
            }
            Self::Transfer {
                to,
                token_identifier,
            } => reply(service.transfer(caller, to, token_identifier).await),
            Self::TransferFrom {
                from,
                to,
                token_identifier,
            } => reply(
                service
                    .transfer_from(caller, from, to, token_identifier)
                    .await,
            ),
            Self::Mint {
                to,
                token_identifier,
                properties,
            } => reply(
                service
                    .mint(caller, to, token_identifier, properties)
                    .await?,
            ),
            Self::Burn(id) => reply(service.burn(caller, id).await),
            Self::Transaction(tx_id) => reply(service.transaction(tx_id).await),
            Self::TotalTransactions => reply(service.total_transactions().await),
            Self::SetTokenProperty {
                token_identifier,
                key,
                value,
            } => reply(
                service
                    .set_token_property(caller, token_identifier, key, value)
                    .await?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_positional_arguments() {
        let args = [json!("aaaaa-aa"), json!("2vxsx-fae"), json!("7")];
        let call = Call::decode(Operation::TransferFrom, &args).unwrap();

        assert_eq!(
            call,
            Call::TransferFrom {
                from: Principal::management(),
                to: Principal::anonymous(),
                token_identifier: Nat::from(7_u64),
            }
        );
        assert_eq!(call.token_identifier(), Some(&Nat::from(7_u64)));
    }

    #[test]
    fn test_decode_mint_properties() {
        let args = [
            json!("aaaaa-aa"),
            json!(1),
            json!([["rarity", {"TextContent": "rare"}]]),
        ];
        let call = Call::decode(Operation::Mint, &args).unwrap();

        let Call::Mint { properties, .. } = call else {
            panic!("expected a mint call");
        };
        let rarity = GenericValue::TextContent("rare".to_string());
        assert_eq!(properties, vec![("rarity".to_string(), rarity)]);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            Call::decode(Operation::BalanceOf, &[]),
            Err(RegistryError::InvalidArguments(_))
        ));
        assert!(matches!(
            Call::decode(Operation::BalanceOf, &[json!(12)]),
            Err(RegistryError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_nullary_calls_have_no_token() {
        let call = Call::decode(Operation::TotalSupply, &[]).unwrap();
        assert_eq!(call, Call::TotalSupply);
        assert_eq!(call.token_identifier(), None);
    }
}
