//! Candid text rendering of a service description.

use std::fmt::Write as _;

use crate::idl::{FuncMode, IdlType, ServiceSchema};

/// Render `schema` as a `.did` service description.
#[must_use]
pub fn render_service(schema: &ServiceSchema) -> String {
    let mut out = String::new();

    for (name, ty) in schema.env.iter() {
        let _ = writeln!(out, "type {name} = {ty};");
    }

    let _ = writeln!(out, "service : ({}) -> {{", render_list(&schema.init));
    for method in &schema.methods {
        let mode = match method.mode {
            FuncMode::Query => " query",
            FuncMode::Update => "",
        };
        let _ = writeln!(
            out,
            "  {} : ({}) -> ({}){mode};",
            method.name,
            render_list(&method.args),
            render_list(&method.rets),
        );
    }
    out.push_str("}\n");
    out
}

fn render_list(types: &[IdlType]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{idl_factory, InterfaceFlavor};

    #[test]
    fn test_render_namespaced_service() {
        let did = render_service(&idl_factory(InterfaceFlavor::Namespaced));

        assert!(did.starts_with("type CanisterInitData = record {"));
        assert!(did.contains("service : (CanisterInitData) -> {\n"));
        assert!(did.contains(
            "  dip721_balance_of : (principal) -> (variant { Err : NftError; Ok : nat; }) query;\n"
        ));
        assert!(did.contains("  dip721_set_logo : (text) -> ();\n"));

        let set_token_property = "  set_token_property : (nat, text, GenericValue) -> \
                                  (variant { Err : NftError; Ok; });\n";
        assert!(did.contains(set_token_property));
        assert!(did.contains(
            "type SupportedInterface = variant { Approval; Burn; Mint; TransactionHistory; };"
        ));
        assert!(did.ends_with("}\n"));
    }

    #[test]
    fn test_render_bare_service() {
        let did = render_service(&idl_factory(InterfaceFlavor::Bare));

        assert!(did.contains("logo : text;"));
        let transfer_from = "  transfer_from : (principal, principal, nat) -> \
                             (variant { Err : NftError; Ok : nat; });\n";
        assert!(did.contains(transfer_from));
        assert!(!did.contains("dip721_"));
    }
}
