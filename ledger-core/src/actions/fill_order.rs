//! Trade against a resting order

use crate::actions::{execute_buffered, output, Action, ExecResult, FailureCode, StateKey, TypedAction};
use crate::codec::{Packer, Unpacker};
use crate::error::Result;
use crate::ids::{AssetId, Id, Identity, ID_LEN};
use crate::keys;
use crate::math;
use crate::records::{self, Order};
use crate::state::StateView;

/// Spend up to `value` of the order's input asset against the resting
/// order's escrow.
///
/// `value` must be a whole multiple of the order's `in_tick`. The fill is
/// clipped to the whole ticks the order has left: any input beyond that
/// simply stays with the filler, it is never debited. The order's owner is
/// restated so fills cannot land on a different order that reused the id
/// after a reorg of the caller's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOrder {
    /// Id of the order to fill
    pub order: Id,
    /// Expected owner of the order
    pub owner: Identity,
    /// Expected input asset of the order
    pub input: AssetId,
    /// Expected output asset of the order
    pub output: AssetId,
    /// Input the filler offers to spend
    pub value: u64,
}

/// Successful fill payload: what moved and what the order has left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderResult {
    /// Input actually debited from the filler
    pub in_amount: u64,
    /// Output credited to the filler
    pub out_amount: u64,
    /// Escrow the order retains after the fill
    pub remaining: u64,
}

impl OrderResult {
    /// Encoded width: three u64 fields.
    pub const LEN: usize = 24;

    /// Canonical big-endian encoding
    pub fn encode(&self) -> Vec<u8> {
        let mut p = Packer::new();
        p.pack_u64(self.in_amount);
        p.pack_u64(self.out_amount);
        p.pack_u64(self.remaining);
        p.into_bytes()
    }

    /// Decode an exact-width payload; trailing bytes are rejected
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut u = Unpacker::new(bytes);
        let in_amount = u.unpack_u64(false)?;
        let out_amount = u.unpack_u64(false)?;
        let remaining = u.unpack_u64(false)?;
        u.finish()?;
        Ok(Self {
            in_amount,
            out_amount,
            remaining,
        })
    }
}

impl FillOrder {
    fn fill(&self, view: &mut dyn StateView, actor: &Identity, order: &Order) -> std::result::Result<OrderResult, FailureCode> {
        if self.value % order.in_tick != 0 {
            return Err(FailureCode::Output(output::VALUE_MISALIGNED));
        }

        // Clip to the whole ticks the order can still serve.
        let offered_ticks = self.value / order.in_tick;
        let remaining_ticks = order.remaining / order.out_tick;
        let ticks = offered_ticks.min(remaining_ticks);
        if ticks == 0 {
            return Err(FailureCode::Output(output::INSUFFICIENT_REMAINING));
        }
        let in_amount = math::mul(ticks, order.in_tick)?;
        let out_amount = math::mul(ticks, order.out_tick)?;
        let remaining = math::sub(order.remaining, out_amount)?;

        records::sub_balance(view, actor, &self.input, in_amount)?;
        records::add_balance(view, &order.owner, &self.input, in_amount)?;
        records::add_balance(view, actor, &self.output, out_amount)?;
        if remaining == 0 {
            records::delete_order(view, &self.order)?;
        } else {
            records::set_order(view, &self.order, &Order { remaining, ..*order })?;
        }

        Ok(OrderResult {
            in_amount,
            out_amount,
            remaining,
        })
    }
}

impl Action for FillOrder {
    fn state_keys(&self, actor: &Identity, _tx_id: &Id) -> Vec<StateKey> {
        vec![
            keys::order_key(&self.order).to_vec(),
            keys::balance_key(actor, &self.input).to_vec(),
            keys::balance_key(actor, &self.output).to_vec(),
            keys::balance_key(&self.owner, &self.input).to_vec(),
        ]
    }

    fn max_units(&self) -> u64 {
        (ID_LEN * 4 + 8) as u64
    }

    fn encode(&self, p: &mut Packer) {
        p.pack_id(&self.order);
        p.pack_identity(&self.owner);
        p.pack_asset_id(&self.input);
        p.pack_asset_id(&self.output);
        p.pack_u64(self.value);
    }

    fn execute(&self, state: &mut dyn StateView, actor: &Identity, _tx_id: &Id) -> ExecResult {
        let units = self.max_units();
        execute_buffered(state, units, |view| {
            if self.value == 0 {
                return Err(FailureCode::Output(output::VALUE_ZERO));
            }
            let order = match records::get_order(view, &self.order)? {
                Some(order) => order,
                None => return Err(FailureCode::Output(output::ORDER_MISSING)),
            };
            if order.owner != self.owner {
                return Err(FailureCode::Output(output::WRONG_OWNER));
            }
            if order.input != self.input {
                return Err(FailureCode::Output(output::WRONG_IN));
            }
            if order.output != self.output {
                return Err(FailureCode::Output(output::WRONG_OUT));
            }
            let result = self.fill(view, actor, &order)?;
            Ok(result.encode())
        })
    }
}

pub(crate) fn decode(u: &mut Unpacker<'_>) -> Result<TypedAction> {
    let order = u.unpack_id(true)?;
    let owner = u.unpack_identity(true)?;
    let input = u.unpack_asset_id()?;
    let output = u.unpack_asset_id()?;
    let value = u.unpack_u64(true)?;
    Ok(TypedAction::FillOrder(FillOrder {
        order,
        owner,
        input,
        output,
        value,
    }))
}
