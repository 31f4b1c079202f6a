//! Cancel a resting order and refund its escrow

use crate::actions::{execute_buffered, output, Action, ExecResult, FailureCode, StateKey, TypedAction};
use crate::codec::{Packer, Unpacker};
use crate::error::Result;
use crate::ids::{AssetId, Id, Identity, ID_LEN};
use crate::keys;
use crate::records;
use crate::state::StateView;

/// Delete the order record and return its remaining escrow to the owner.
/// Only the creator may close. The caller restates the `output` asset so a
/// stale or mistaken close against the wrong order fails loudly instead of
/// refunding the wrong balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseOrder {
    /// Id of the order to close
    pub order: Id,
    /// Expected output asset of the order
    pub output: AssetId,
}

impl Action for CloseOrder {
    fn state_keys(&self, actor: &Identity, _tx_id: &Id) -> Vec<StateKey> {
        vec![
            keys::order_key(&self.order).to_vec(),
            keys::balance_key(actor, &self.output).to_vec(),
        ]
    }

    fn max_units(&self) -> u64 {
        (ID_LEN * 2) as u64
    }

    fn encode(&self, p: &mut Packer) {
        p.pack_id(&self.order);
        p.pack_asset_id(&self.output);
    }

    fn execute(&self, state: &mut dyn StateView, actor: &Identity, _tx_id: &Id) -> ExecResult {
        let units = self.max_units();
        execute_buffered(state, units, |view| {
            let order = match records::get_order(view, &self.order)? {
                Some(order) => order,
                None => return Err(FailureCode::Output(output::ORDER_MISSING)),
            };
            if order.owner != *actor {
                return Err(FailureCode::Output(output::UNAUTHORIZED));
            }
            if order.output != self.output {
                return Err(FailureCode::Output(output::WRONG_OUT));
            }
            records::delete_order(view, &self.order)?;
            records::add_balance(view, actor, &self.output, order.remaining)?;
            Ok(Vec::new())
        })
    }
}

pub(crate) fn decode(u: &mut Unpacker<'_>) -> Result<TypedAction> {
    let order = u.unpack_id(true)?;
    let output = u.unpack_asset_id()?;
    Ok(TypedAction::CloseOrder(CloseOrder { order, output }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionRegistry;
    use crate::records::Order;
    use crate::state::MemState;

    fn open_order(state: &mut MemState, owner: Identity, output: AssetId, remaining: u64) -> Id {
        let id = Id::from_data(b"order");
        records::set_order(
            state,
            &id,
            &Order {
                input: AssetId::Native,
                in_tick: 1,
                output,
                out_tick: 10,
                remaining,
                owner,
            },
        )
        .unwrap();
        id
    }

    #[test]
    fn test_close_refunds_remaining() {
        let owner = Identity::new([1u8; 32]);
        let asset = AssetId::Issued(Id::from_data(b"a"));
        let mut state = MemState::new();
        let order = open_order(&mut state, owner, asset, 70);

        let result = CloseOrder { order, output: asset }.execute(&mut state, &owner, &Id::from_data(b"tx"));
        assert!(result.success, "{:?}", result.output);
        assert_eq!(result.units, 64);

        assert!(records::get_order(&state, &order).unwrap().is_none());
        assert_eq!(records::get_balance(&state, &owner, &asset).unwrap(), 70);
    }

    #[test]
    fn test_non_owner_cannot_close() {
        let owner = Identity::new([1u8; 32]);
        let other = Identity::new([2u8; 32]);
        let asset = AssetId::Issued(Id::from_data(b"a"));
        let mut state = MemState::new();
        let order = open_order(&mut state, owner, asset, 70);

        let result = CloseOrder { order, output: asset }.execute(&mut state, &other, &Id::from_data(b"tx"));
        assert!(!result.success);
        assert_eq!(result.output, output::UNAUTHORIZED);
        assert!(records::get_order(&state, &order).unwrap().is_some());
        assert_eq!(records::get_balance(&state, &other, &asset).unwrap(), 0);
    }

    #[test]
    fn test_wrong_output_asset_rejected() {
        let owner = Identity::new([1u8; 32]);
        let asset = AssetId::Issued(Id::from_data(b"a"));
        let mut state = MemState::new();
        let order = open_order(&mut state, owner, asset, 70);

        let result = CloseOrder { order, output: AssetId::Native }.execute(&mut state, &owner, &Id::from_data(b"tx"));
        assert!(!result.success);
        assert_eq!(result.output, output::WRONG_OUT);
    }

    #[test]
    fn test_missing_order_rejected() {
        let owner = Identity::new([1u8; 32]);
        let mut state = MemState::new();

        let result = CloseOrder {
            order: Id::from_data(b"absent"),
            output: AssetId::Native,
        }
        .execute(&mut state, &owner, &Id::from_data(b"tx"));
        assert!(!result.success);
        assert_eq!(result.output, output::ORDER_MISSING);
    }

    #[test]
    fn test_wire_roundtrip() {
        let registry = ActionRegistry::standard();
        let action = TypedAction::CloseOrder(CloseOrder {
            order: Id::from_data(b"order"),
            output: AssetId::Issued(Id::from_data(b"a")),
        });
        assert_eq!(registry.decode(&action.encode()).unwrap(), action);
    }
}
