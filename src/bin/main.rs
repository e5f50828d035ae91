use avl_arena::{AvlTree, BinarySearchTree};

fn main() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for key in [10, 20, 30, 40, 50, 25] {
        tree.insert(key);
        tree.assert_invariants();
        println!("insert {key}: {:?}", tree.iter().collect::<Vec<_>>());
    }

    print!("{}", tree.render());

    let root = tree.root();
    println!(
        "root height {}, balance factor {}",
        tree.height(root),
        tree.balance_factor(root)
    );

    if let Some(next) = tree.successor(&25).and_then(|node| tree.key(node)) {
        println!("successor of 25: {next}");
    }

    tree.remove(&40);
    tree.assert_invariants();
    println!("remove 40: {:?}", tree.iter().collect::<Vec<_>>());
    print!("{}", tree.render());

    // The same keys without balancing degenerate into a longer path.
    let plain: BinarySearchTree<u32> = [10, 20, 30, 40, 50, 25].into_iter().collect();
    plain.assert_invariants();
    println!("unbalanced height {}", plain.height(plain.root()));
    print!("{}", plain.render());

    drop(tree);
}
