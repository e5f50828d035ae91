use std::{collections::VecDeque, fmt};

use crate::{NodeRef, Tree};

impl<K: fmt::Display, B> Tree<K, B> {
    /// Writes an indented drawing of the tree, one node per line.
    ///
    /// Each line shows a key and its cached height. The right child is listed before the left
    /// child, so tilting the output counter-clockwise gives the usual picture. An empty tree
    /// writes nothing.
    ///
    /// ```
    /// use avl_arena::AvlTree;
    ///
    /// let tree: AvlTree<u32> = [2, 1, 3].into_iter().collect();
    /// assert_eq!(tree.render(), "2 (h=2)\n├── R: 3 (h=1)\n└── L: 1 (h=1)\n");
    /// ```
    pub fn write_tree<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        match self.root {
            Some(root) => self.write_subtree(w, "", root),
            None => Ok(()),
        }
    }

    /// Renders the whole tree to a string. See [`Tree::write_tree`].
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a `String` cannot fail.
        let _ = self.write_tree(&mut out);
        out
    }

    /// Renders the subtree rooted at `node`, starting every line with `prefix`.
    ///
    /// Returns an empty string if `node` is stale.
    pub fn render_from(&self, prefix: &str, node: NodeRef) -> String {
        let mut out = String::new();

        if self.nodes.get(node).is_some() {
            out.push_str(prefix);
            let _ = self.write_subtree(&mut out, prefix, node);
        }

        out
    }

    fn write_subtree<W: fmt::Write>(&self, w: &mut W, prefix: &str, node: NodeRef) -> fmt::Result {
        let n = &self.nodes[node];
        writeln!(w, "{} (h={})", n.key(), n.height())?;

        let children: Vec<_> = [("R", n.right()), ("L", n.left())]
            .into_iter()
            .filter_map(|(side, child)| Some((side, child?)))
            .collect();

        for (i, &(side, child)) in children.iter().enumerate() {
            let (branch, indent) = if i + 1 == children.len() {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };

            write!(w, "{prefix}{branch}{side}: ")?;
            self.write_subtree(w, &format!("{prefix}{indent}"), child)?;
        }

        Ok(())
    }

    /// Writes the tree in Graphviz `dot` format, one rank per tree level.
    ///
    /// Missing children are drawn as points. Node labels are `key:height`.
    pub fn dotgraph<W: fmt::Write>(&self, name: &str, mut w: W) -> fmt::Result {
        let root = match self.root {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item {
            Node(NodeRef),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut links = String::new();

        while !queue.is_empty() {
            use fmt::Write;
            let remaining = queue.len();

            write!(w, "{{rank=same; ")?;

            for item in queue.drain(..remaining).collect::<Vec<_>>() {
                let node = match item {
                    Item::Node(node) => node,
                    Item::Missing(id) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                let n = &self.nodes[node];
                let key = n.key();
                write!(w, "\"graph{name}-{key}\" [label=\"{key}:{}\"]; ", n.height())?;

                // Leaves get no placeholder children.
                if n.is_leaf() {
                    continue;
                }

                for child in [n.left(), n.right()] {
                    if let Some(child) = child {
                        let child_key = self.nodes[child].key();

                        queue.push_back(Item::Node(child));
                        writeln!(links, "\"graph{name}-{key}\" -> \"graph{name}-{child_key}\";")?;
                    } else {
                        queue.push_back(Item::Missing(missing));
                        writeln!(links, "\"graph{name}-{key}\" -> \"graph{name}-missing{missing}\";")?;
                        missing += 1;
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }
}
