use avl_tree::AvlTree;

fn main() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for key in [2, 0, 3, 4, 5, 1, 6] {
        tree.insert(key);
        tree.assert_invariants();
        println!(
            "{:?} (height {})",
            tree.iter().collect::<Vec<_>>(),
            tree.height()
        );
    }

    print!("Level order:");
    tree.level_traverse(|key| print!(" {key}"));
    println!();

    for key in [0, 7] {
        println!("depth({key}) = {}", tree.depth(&key));
    }

    match tree.retrieve(&7) {
        Ok(key) => println!("retrieved {key}"),
        Err(e) => println!("retrieve(7): {e}"),
    }

    let zero = tree.remove(&0);
    assert_eq!(zero, Some(0));
    tree.assert_invariants();

    let mut graph = String::new();
    if tree.dotgraph("demo", &mut graph).is_ok() {
        println!("{graph}");
    }

    drop(tree);
}
