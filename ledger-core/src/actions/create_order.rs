//! Create a resting limit order

use crate::actions::{execute_buffered, output, Action, ExecResult, FailureCode, StateKey, TypedAction};
use crate::codec::{Packer, Unpacker};
use crate::error::Result;
use crate::ids::{AssetId, Id, Identity, ID_LEN};
use crate::keys;
use crate::records::{self, Order};
use crate::state::StateView;

/// Escrow `supply` of `output` into an order that sells it for `input` at
/// the fixed rate `in_tick`/`out_tick`. The order is keyed by this
/// transaction's id.
///
/// `supply` must be a whole multiple of `out_tick` so every fill consumes
/// whole ticks and no un-fillable remainder can be left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOrder {
    /// Asset the creator wants to receive
    pub input: AssetId,
    /// Input units per tick
    pub in_tick: u64,
    /// Asset the creator is selling
    pub output: AssetId,
    /// Output units per tick
    pub out_tick: u64,
    /// Total output escrowed
    pub supply: u64,
}

impl Action for CreateOrder {
    fn state_keys(&self, actor: &Identity, tx_id: &Id) -> Vec<StateKey> {
        vec![
            keys::balance_key(actor, &self.output).to_vec(),
            keys::order_key(tx_id).to_vec(),
        ]
    }

    fn max_units(&self) -> u64 {
        (ID_LEN * 2 + 8 * 3) as u64
    }

    fn encode(&self, p: &mut Packer) {
        p.pack_asset_id(&self.input);
        p.pack_u64(self.in_tick);
        p.pack_asset_id(&self.output);
        p.pack_u64(self.out_tick);
        p.pack_u64(self.supply);
    }

    fn execute(&self, state: &mut dyn StateView, actor: &Identity, tx_id: &Id) -> ExecResult {
        let units = self.max_units();
        execute_buffered(state, units, |view| {
            if self.input == self.output {
                return Err(FailureCode::Output(output::SAME_IN_OUT));
            }
            if self.in_tick == 0 {
                return Err(FailureCode::Output(output::IN_TICK_ZERO));
            }
            if self.out_tick == 0 {
                return Err(FailureCode::Output(output::OUT_TICK_ZERO));
            }
            if self.supply == 0 {
                return Err(FailureCode::Output(output::SUPPLY_ZERO));
            }
            if self.supply % self.out_tick != 0 {
                return Err(FailureCode::Output(output::SUPPLY_MISALIGNED));
            }
            records::sub_balance(view, actor, &self.output, self.supply)?;
            records::set_order(
                view,
                tx_id,
                &Order {
                    input: self.input,
                    in_tick: self.in_tick,
                    output: self.output,
                    out_tick: self.out_tick,
                    remaining: self.supply,
                    owner: *actor,
                },
            )?;
            Ok(Vec::new())
        })
    }
}

pub(crate) fn decode(u: &mut Unpacker<'_>) -> Result<TypedAction> {
    let input = u.unpack_asset_id()?;
    let in_tick = u.unpack_u64(true)?;
    let output = u.unpack_asset_id()?;
    let out_tick = u.unpack_u64(true)?;
    let supply = u.unpack_u64(true)?;
    Ok(TypedAction::CreateOrder(CreateOrder {
        input,
        in_tick,
        output,
        out_tick,
        supply,
    }))
}
