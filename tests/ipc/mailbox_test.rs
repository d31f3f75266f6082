/*!
 * Mailbox Tests
 * Reserve, fill, send, receive and release over a static arena
 */

use pretty_assertions::assert_eq;
use static_mem::{IpcError, Mailbox, MemoryError, StaticAllocator};
use std::sync::mpsc;

#[test]
fn test_message_round_trip_with_notification() {
    let mut alloc = StaticAllocator::new();
    let (tx, rx) = mpsc::channel();
    let mut mailbox = Mailbox::new(&mut alloc, 0x20, vec![0u8; 256])
        .unwrap()
        .with_callback(move |address| {
            let _ = tx.send(address);
        });

    let payloads: [&[u8]; 3] = [b"alpha", b"bravo-two", b"c"];
    let mut addresses = Vec::new();
    for payload in payloads {
        let addr = mailbox.init_message(&mut alloc, payload.len()).unwrap();
        mailbox
            .message_mut(&alloc, addr)
            .unwrap()
            .copy_from_slice(payload);
        addresses.push(addr);
    }
    assert_eq!(mailbox.pending_count(), 3);
    assert_eq!(mailbox.message_count(), 0);

    for &addr in &addresses {
        mailbox.send_message(&mut alloc, addr).unwrap();
    }
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), addresses);

    for payload in payloads {
        let (addr, bytes) = mailbox.receive_message(&alloc).unwrap();
        assert_eq!(bytes, payload);
        mailbox.release_message(&mut alloc, addr).unwrap();
    }

    assert!(mailbox.receive_message(&alloc).is_none());
    assert_eq!(mailbox.mem_list().num_free_blocks(), 1);
    mailbox.check_consistency(&alloc).unwrap();
}

#[test]
fn test_pending_messages_are_not_freeable() {
    let mut alloc = StaticAllocator::new();
    let mut mailbox = Mailbox::new(&mut alloc, 1, vec![0u8; 64]).unwrap();

    let addr = mailbox.init_message(&mut alloc, 8).unwrap();
    assert_eq!(
        mailbox.release_message(&mut alloc, addr),
        Err(IpcError::Memory(MemoryError::BlockNotFound(addr)))
    );
    mailbox.check_consistency(&alloc).unwrap();

    mailbox.discard_message(&mut alloc, addr).unwrap();
    assert_eq!(
        mailbox.discard_message(&mut alloc, addr),
        Err(IpcError::NotPending(addr))
    );
}

#[test]
fn test_mailboxes_share_header_pool() {
    let mut alloc = StaticAllocator::with_capacity(3);
    let mut a = Mailbox::new(&mut alloc, 1, vec![0u8; 32]).unwrap();
    let mut b = Mailbox::new(&mut alloc, 2, vec![0u8; 32]).unwrap();

    a.init_message(&mut alloc, 8).unwrap();
    assert_eq!(
        b.init_message(&mut alloc, 8),
        Err(IpcError::Memory(MemoryError::PoolExhausted { capacity: 3 }))
    );
    // A whole-arena message needs no extra header
    assert_eq!(b.init_message(&mut alloc, 32).unwrap(), 0);
}
