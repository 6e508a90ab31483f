//! Helpers shared by the job behaviours.

use col_behavior::{BehaviorError, BehaviorResult, TaskContext};
use col_core::BuildingId;
use col_world::container;
use col_world::{ItemKind, ItemStack, ToolType};

use crate::Colony;

/// Saturation spent per completed work action.
pub const ACTION_SATURATION_COST: f64 = 0.1;

/// Ticks between re-checks while waiting for a requested item.
pub const REQUEST_DELAY: u32 = 60;

/// Range within which a worker counts as "at" its building.
pub const BUILDING_RANGE: i32 = 3;

/// The citizen's work building, or an error if it has no job or no building.
pub fn work_building(ctx: &TaskContext<'_, Colony>) -> BehaviorResult<BuildingId> {
    let citizen = ctx.citizen();
    let job = citizen.job().ok_or(BehaviorError::NoJob(citizen.id()))?;
    job.work_building.ok_or(BehaviorError::NoJob(citizen.id()))
}

/// The item requested when a worker lacks a tool of `tool` type.
pub fn basic_tool(tool: ToolType) -> ItemKind {
    match tool {
        ToolType::Sword => ItemKind::WoodenSword,
        ToolType::Shield => ItemKind::Shield,
        ToolType::Pickaxe => ItemKind::WoodenPickaxe,
        ToolType::Shovel => ItemKind::IronShovel,
        ToolType::Axe => ItemKind::IronAxe,
    }
}

/// First inventory slot holding a tool of type `tool`.
pub fn tool_slot(ctx: &TaskContext<'_, Colony>, tool: ToolType) -> Option<usize> {
    container::find_first_slot(ctx.citizen().inventory(), |s| s.kind.tool_type() == Some(tool))
}

/// `true` when the worker lacks a `tool`; a request for one is opened (once).
/// A request whose tool has turned up is closed.
pub fn check_for_tool(ctx: &mut TaskContext<'_, Colony>, tool: ToolType) -> bool {
    let id = ctx.citizen().id();
    let wanted = basic_tool(tool);
    if tool_slot(ctx, tool).is_some() {
        ctx.colony.take_request(id, wanted);
        return false;
    }
    if ctx.colony.request_item(id, ItemStack::new(wanted, 1)) {
        tracing::debug!(citizen = %id, ?tool, "missing tool requested");
    }
    true
}

/// Move everything except tools and meshes from the worker into its
/// building.  Items that do not fit stay with the worker.  Returns the count
/// moved.
pub fn dump_inventory(ctx: &mut TaskContext<'_, Colony>, building: BuildingId) -> BehaviorResult<u32> {
    let target = ctx.colony.require_mut(building)?;
    let keep = |s: &ItemStack| s.kind.tool_type().is_some() || s.kind.is_mesh();
    let moved = container::transfer_matching(
        ctx.worker.citizen_mut().inventory_mut(),
        target.inventory_mut(),
        |s| !keep(s),
        u32::MAX,
    );
    if let Some(job) = ctx.worker.citizen_mut().job_mut() {
        job.clear_actions();
    }
    tracing::debug!(citizen = %ctx.citizen().id(), building = %building, moved, "inventory dumped");
    Ok(moved)
}
