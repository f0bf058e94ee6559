//! Binary-tree bin packer that grows its canvas as needed.
//!
//! Blocks are placed largest first (by their longer side). When no free node
//! fits, the root grows right or down, whichever keeps the canvas closer to a
//! square. Every block is inflated by `padding` on its right and bottom edge;
//! the reported canvas size drops the trailing padding.

/// Top-left corner of a packed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

/// Result of packing: one placement per input block, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    used: bool,
    right: Option<usize>,
    down: Option<usize>,
}

impl Node {
    const fn free(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            used: false,
            right: None,
            down: None,
        }
    }
}

/// Node arena; index 0 is never reused once the root grows.
struct Packer {
    nodes: Vec<Node>,
    root: usize,
}

impl Packer {
    fn new(w: u32, h: u32) -> Self {
        Self {
            nodes: vec![Node::free(0, 0, w, h)],
            root: 0,
        }
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn find(&self, start: usize, w: u32, h: u32) -> Option<usize> {
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let node = self.nodes[idx];
            if node.used {
                // right before down
                stack.extend(node.down);
                stack.extend(node.right);
            } else if w <= node.w && h <= node.h {
                return Some(idx);
            }
        }
        None
    }

    fn split(&mut self, idx: usize, w: u32, h: u32) -> Placement {
        let node = self.nodes[idx];
        let down = self.push(Node::free(node.x, node.y + h, node.w, node.h - h));
        let right = self.push(Node::free(node.x + w, node.y, node.w - w, h));

        let node = &mut self.nodes[idx];
        node.used = true;
        node.down = Some(down);
        node.right = Some(right);
        Placement {
            x: node.x,
            y: node.y,
        }
    }

    fn grow(&mut self, w: u32, h: u32) -> Option<Placement> {
        let root = self.nodes[self.root];
        let can_grow_down = w <= root.w;
        let can_grow_right = h <= root.h;

        let should_grow_right = can_grow_right && root.h >= root.w + w;
        let should_grow_down = can_grow_down && root.w >= root.h + h;

        if should_grow_right {
            self.grow_right(w, h)
        } else if should_grow_down {
            self.grow_down(w, h)
        } else if can_grow_right {
            self.grow_right(w, h)
        } else if can_grow_down {
            self.grow_down(w, h)
        } else {
            None
        }
    }

    fn grow_right(&mut self, w: u32, h: u32) -> Option<Placement> {
        let old = self.nodes[self.root];
        let right = self.push(Node::free(old.w, 0, w, old.h));
        let mut root = Node::free(0, 0, old.w + w, old.h);
        root.used = true;
        root.down = Some(self.root);
        root.right = Some(right);
        self.root = self.push(root);
        self.place(w, h)
    }

    fn grow_down(&mut self, w: u32, h: u32) -> Option<Placement> {
        let old = self.nodes[self.root];
        let down = self.push(Node::free(0, old.h, old.w, h));
        let mut root = Node::free(0, 0, old.w, old.h + h);
        root.used = true;
        root.down = Some(down);
        root.right = Some(self.root);
        self.root = self.push(root);
        self.place(w, h)
    }

    fn place(&mut self, w: u32, h: u32) -> Option<Placement> {
        let idx = self.find(self.root, w, h)?;
        Some(self.split(idx, w, h))
    }
}

/// Pack `sizes` (width, height) with `padding` pixels between blocks.
///
/// Returns `None` for an empty input.
pub fn pack(sizes: &[(u32, u32)], padding: u32) -> Option<Layout> {
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    // stable: equal sides keep input order
    order.sort_by_key(|&i| std::cmp::Reverse(sizes[i].0.max(sizes[i].1)));

    let first = *order.first()?;
    let inflate = |i: usize| (sizes[i].0 + padding, sizes[i].1 + padding);
    let (w, h) = inflate(first);
    let mut packer = Packer::new(w, h);

    let mut placements = vec![Placement { x: 0, y: 0 }; sizes.len()];
    for idx in order {
        let (w, h) = inflate(idx);
        let placement = match packer.place(w, h) {
            Some(placement) => placement,
            None => packer.grow(w, h)?,
        };
        placements[idx] = placement;
    }

    let width = placements
        .iter()
        .zip(sizes)
        .map(|(p, (w, _))| p.x + w)
        .max()
        .unwrap_or(0);
    let height = placements
        .iter()
        .zip(sizes)
        .map(|(p, (_, h))| p.y + h)
        .max()
        .unwrap_or(0);

    Some(Layout {
        width,
        height,
        placements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlaps(a: (Placement, (u32, u32)), b: (Placement, (u32, u32))) -> bool {
        let (pa, (wa, ha)) = a;
        let (pb, (wb, hb)) = b;
        pa.x < pb.x + wb && pb.x < pa.x + wa && pa.y < pb.y + hb && pb.y < pa.y + ha
    }

    #[test]
    fn test_two_icons_side_by_side() {
        let layout = pack(&[(16, 16), (16, 16)], 4).unwrap();
        assert_eq!(layout.width, 36);
        assert_eq!(layout.height, 16);
        assert_eq!(layout.placements[0], Placement { x: 0, y: 0 });
        assert_eq!(layout.placements[1], Placement { x: 20, y: 0 });
    }

    #[test]
    fn test_single_icon_has_no_padding() {
        let layout = pack(&[(10, 7)], 4).unwrap();
        assert_eq!((layout.width, layout.height), (10, 7));
    }

    #[test]
    fn test_empty_input() {
        assert!(pack(&[], 4).is_none());
    }

    #[test]
    fn test_largest_first_placed_at_origin() {
        let layout = pack(&[(8, 8), (32, 32), (16, 16)], 2).unwrap();
        assert_eq!(layout.placements[1], Placement { x: 0, y: 0 });
    }

    #[test]
    fn test_no_overlap_with_padding() {
        let sizes = [
            (16, 16),
            (32, 8),
            (8, 32),
            (24, 24),
            (10, 10),
            (10, 10),
            (40, 12),
            (5, 30),
        ];
        let padding = 3;
        let layout = pack(&sizes, padding).unwrap();

        let padded: Vec<_> = sizes.iter().map(|&(w, h)| (w + padding, h + padding)).collect();
        for i in 0..sizes.len() {
            let (p, (w, h)) = (layout.placements[i], sizes[i]);
            assert!(p.x + w <= layout.width);
            assert!(p.y + h <= layout.height);
            for j in (i + 1)..sizes.len() {
                assert!(
                    !overlaps(
                        (layout.placements[i], padded[i]),
                        (layout.placements[j], padded[j])
                    ),
                    "blocks {i} and {j} overlap"
                );
            }
        }
    }
}
