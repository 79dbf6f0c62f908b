use std::collections::VecDeque;

use crate::bsp::polygon::{DrawPolygon, PlaneSide};

#[derive(Debug)]
struct BspNode {
    polygon: usize,
    front: Option<usize>,
    back: Option<usize>,
    coplanars: Vec<usize>,
}

impl BspNode {
    fn new(polygon: usize) -> Self {
        Self {
            polygon,
            front: None,
            back: None,
            coplanars: Vec::new(),
        }
    }
}

/// Binary space partition over the polygons of one sorting context.
///
/// Nodes and polygons live in flat arenas addressed by index; the first polygon of every
/// sub-list becomes the splitting plane for the rest of it.
#[derive(Debug)]
pub struct BspTree {
    polygons: Vec<DrawPolygon>,
    nodes: Vec<BspNode>,
    root: Option<usize>,
}

impl BspTree {
    /// Build a tree, draining `list`.
    #[tracing::instrument(level = "trace", skip_all, fields(polygons = list.len()))]
    pub fn new(list: &mut VecDeque<DrawPolygon>) -> Self {
        let mut tree = Self {
            polygons: list.drain(..).collect(),
            nodes: Vec::new(),
            root: None,
        };
        let initial: Vec<usize> = (0..tree.polygons.len()).collect();
        tree.root = tree.build(initial);
        tracing::trace!(
            nodes = tree.nodes.len(),
            fragments = tree.polygons.len(),
            "bsp tree built"
        );
        tree
    }

    /// Number of splitting nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when built from an empty list.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn build(&mut self, initial: Vec<usize>) -> Option<usize> {
        let (&first, rest) = initial.split_first()?;
        let root = self.push_node(first);
        let mut work = vec![(root, rest.to_vec())];

        while let Some((node, remaining)) = work.pop() {
            let plane = self.nodes[node].polygon;
            let mut front_list = Vec::new();
            let mut back_list = Vec::new();

            for idx in remaining {
                match self.polygons[plane].classify(&self.polygons[idx]) {
                    PlaneSide::Front => front_list.push(idx),
                    PlaneSide::Back => back_list.push(idx),
                    PlaneSide::Coplanar => self.nodes[node].coplanars.push(idx),
                    PlaneSide::Straddling { front, back } => {
                        if let Some(front) = front {
                            front_list.push(self.push_polygon(front));
                        }
                        if let Some(back) = back {
                            back_list.push(self.push_polygon(back));
                        }
                    }
                }
            }

            if let Some((&first, rest)) = front_list.split_first() {
                let child = self.push_node(first);
                self.nodes[node].front = Some(child);
                work.push((child, rest.to_vec()));
            }
            if let Some((&first, rest)) = back_list.split_first() {
                let child = self.push_node(first);
                self.nodes[node].back = Some(child);
                work.push((child, rest.to_vec()));
            }
        }
        Some(root)
    }

    fn push_node(&mut self, polygon: usize) -> usize {
        self.nodes.push(BspNode::new(polygon));
        self.nodes.len() - 1
    }

    fn push_polygon(&mut self, polygon: DrawPolygon) -> usize {
        self.polygons.push(polygon);
        self.polygons.len() - 1
    }

    /// Visit every surviving polygon or fragment back-to-front.
    pub fn traverse(&self, mut visit: impl FnMut(&DrawPolygon)) {
        for idx in self.draw_order() {
            visit(&self.polygons[idx]);
        }
    }

    /// Consume the tree, returning polygons back-to-front.
    pub fn into_draw_order(self) -> Vec<DrawPolygon> {
        let order = self.draw_order();
        let mut slots: Vec<Option<DrawPolygon>> = self.polygons.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect()
    }

    fn draw_order(&self) -> Vec<usize> {
        enum Step {
            Visit(usize),
            Emit(usize),
        }

        let mut order = Vec::with_capacity(self.polygons.len());
        let mut stack: Vec<Step> = self.root.map(Step::Visit).into_iter().collect();
        while let Some(step) = stack.pop() {
            match step {
                Step::Emit(node) => {
                    let node = &self.nodes[node];
                    order.push(node.polygon);
                    order.extend_from_slice(&node.coplanars);
                }
                Step::Visit(idx) => {
                    let node = &self.nodes[idx];
                    let (near, far) = if self.polygons[node.polygon].faces_viewer() {
                        (node.front, node.back)
                    } else {
                        (node.back, node.front)
                    };
                    // Pushed in reverse: far subtree, node, then near subtree.
                    stack.extend(near.map(Step::Visit));
                    stack.push(Step::Emit(idx));
                    stack.extend(far.map(Step::Visit));
                }
            }
        }
        order
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bsp/tree.rs"]
mod tests;
