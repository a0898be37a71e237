use crate::codec::encode_counter;
use crate::keys::COUNTER_KEY;
use crate::*;

#[test]
fn missing_counter_means_first_id() {
    let backend = MemoryBackend::new();
    assert_eq!(IdAllocator::new().next_id(&backend).unwrap(), FIRST_ID);
}

#[test]
fn advance_persists_successor() {
    let mut backend = MemoryBackend::new();
    let alloc = IdAllocator::new();

    let id = alloc.next_id(&backend).unwrap();
    alloc.advance(&mut backend, id).unwrap();

    assert_eq!(alloc.next_id(&backend).unwrap(), 2);
    assert_eq!(
        backend.get(COUNTER_KEY).unwrap(),
        Some(encode_counter(2).to_vec())
    );
}

#[test]
fn next_id_does_not_write() {
    let backend = MemoryBackend::new();
    let alloc = IdAllocator::new();
    alloc.next_id(&backend).unwrap();
    alloc.next_id(&backend).unwrap();
    assert!(backend.is_empty());
}

#[test]
fn corrupt_counter_is_a_decode_error() {
    let mut backend = MemoryBackend::new();
    backend.put(COUNTER_KEY, b"seven".to_vec()).unwrap();

    let err = IdAllocator::new().next_id(&backend).unwrap_err();
    match err {
        TodoError::Decode { key, .. } => assert_eq!(key, "nextid"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn exhausted_counter_is_refused_before_any_write() {
    let mut backend = MemoryBackend::new();
    backend
        .put(COUNTER_KEY, encode_counter(u64::MAX).to_vec())
        .unwrap();

    let err = IdAllocator::new().next_id(&backend).unwrap_err();
    assert!(matches!(err, TodoError::Storage(_)));
}
