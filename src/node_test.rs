use super::*;

#[test]
fn test_node() {
    let mut node: Node<u32, u32> = Node::new(10, 200, None);
    assert_eq!(node.is_black(), false);
    assert_eq!(node.is_leaf(), true);
    assert_eq!(node.parent, None);

    node.set_red();
    assert_eq!(node.is_black(), false);
    node.set_black();
    assert_eq!(node.is_black(), true);
    node.toggle_link();
    assert_eq!(node.is_black(), false);

    assert_eq!(node.into_entry(), (10, 200));
}

#[test]
fn test_arena() {
    let mut arena: Arena<u32, u32> = Arena::new();

    let a = arena.alloc(Node::new(1, 10, None));
    let b = arena.alloc(Node::new(2, 20, Some(a)));
    arena[a].right = Some(b);
    assert_eq!(arena.live(), 2);
    assert_eq!(arena[b].parent, Some(a));
    assert_eq!(arena[a].is_leaf(), false);

    arena[b].value = 21;
    let node = arena.free(b);
    assert_eq!(node.into_entry(), (2, 21));
    assert_eq!(arena.live(), 1);

    // freed handle is recycled.
    let c = arena.alloc(Node::new(3, 30, None));
    assert_eq!(c, b);
    assert_eq!(arena[c].key, 3);
    assert_eq!(arena.live(), 2);

    arena.reset();
    assert_eq!(arena.live(), 0);
}

#[test]
#[should_panic]
fn test_arena_double_free() {
    let mut arena: Arena<u32, u32> = Arena::new();
    let a = arena.alloc(Node::new(1, 10, None));
    arena.free(a);
    arena.free(a);
}

#[test]
#[should_panic]
fn test_arena_dangling() {
    let mut arena: Arena<u32, u32> = Arena::new();
    let a = arena.alloc(Node::new(1, 10, None));
    arena.free(a);
    let _ = arena[a].key;
}
