/*!
 * stcmem-demo
 *
 * Exercises the static allocator end to end:
 * - The 512-byte split/merge scenario
 * - A mailbox message round-trip
 * - Statistics and a JSON snapshot of the final state
 */

use anyhow::{ensure, Context, Result};
use tracing::info;

use static_mem::{
    init_tracing, span_operation, AllocatorConfig, Mailbox, MemList, StaticAllocator,
};

const SCENARIO_ARENA: usize = 512;
const MAILBOX_ARENA: usize = 128;

fn main() -> Result<()> {
    init_tracing();

    let config = AllocatorConfig::from_env().context("invalid allocator configuration")?;
    info!(?config, "stcmem demo starting");

    let mut alloc = StaticAllocator::with_config(config);

    let mut list = MemList::new(0x01);
    run_scenario(&mut alloc, &mut list)?;
    alloc.log_lists(&list);

    run_mailbox(&mut alloc)?;

    let stats = alloc.stats(&list);
    println!(
        "module 0x{:02x}: {} / {} bytes used, {} free block(s), pressure {}",
        stats.module_id,
        stats.used_memory,
        stats.total_memory,
        stats.free_blocks,
        stats.memory_pressure()
    );
    println!("{}", alloc.snapshot(&list).to_json()?);

    info!(
        headers_in_use = alloc.pool().in_use(),
        headers_available = alloc.pool().available(),
        "stcmem demo finished"
    );
    Ok(())
}

/// Split the arena in halves, quarters and eighths, then free it back to one block
fn run_scenario(alloc: &mut StaticAllocator, list: &mut MemList) -> Result<()> {
    let span = span_operation("scenario_512", list.module_id());
    let _guard = span.enter();

    alloc.init_mem_list(list, vec![0u8; SCENARIO_ARENA])?;

    let first = alloc.malloc(list, 256)?;
    let second = alloc.malloc(list, 256)?;
    ensure!(list.num_free_blocks() == 0, "arena should be full");

    alloc.free(list, first)?;
    let quarter_a = alloc.malloc(list, 128)?;
    let quarter_b = alloc.malloc(list, 128)?;

    alloc.free(list, quarter_a)?;
    let eighth_a = alloc.malloc(list, 64)?;
    let eighth_b = alloc.malloc(list, 64)?;

    for address in [second, eighth_b, quarter_b, eighth_a] {
        alloc.free(list, address)?;
    }
    if !alloc.config().eager_coalesce {
        alloc.merge_pass(list);
    }

    alloc.check_consistency(list)?;
    ensure!(
        list.num_free_blocks() == 1 && list.num_alloc_blocks() == 0,
        "arena did not coalesce back into one block"
    );

    span.record_items_processed(list.counters().alloc_calls as usize);
    span.record_result(true);
    Ok(())
}

fn run_mailbox(alloc: &mut StaticAllocator) -> Result<()> {
    let span = span_operation("mailbox_round_trip", 0x02);
    let _guard = span.enter();

    let mut mailbox = Mailbox::new(alloc, 0x02, vec![0u8; MAILBOX_ARENA])?
        .with_callback(|address| info!(address, "message ready"));

    let payload = b"hello from stcmem";
    let address = mailbox.init_message(alloc, payload.len())?;
    mailbox
        .message_mut(alloc, address)
        .context("reserved message is not writable")?
        .copy_from_slice(payload);
    mailbox.send_message(alloc, address)?;

    let (received_at, bytes) = mailbox
        .receive_message(alloc)
        .context("sent message was not received")?;
    println!(
        "received {} bytes at 0x{:x}: {}",
        bytes.len(),
        received_at,
        String::from_utf8_lossy(bytes)
    );
    if let Some(dump) = alloc.hexdump_arena(mailbox.mem_list()) {
        println!("{dump}");
    }

    mailbox.release_message(alloc, received_at)?;
    mailbox.check_consistency(alloc)?;
    span.record_result(true);
    Ok(())
}
