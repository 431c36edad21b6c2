//! Octree acceleration structure.
//!
//! Shapes are placed by their centre point: a node holds up to `capacity`
//! shapes, then splits its boundary into eight equal octants and pushes its
//! shapes down into them. Because a shape may extend past the octant that
//! holds its centre, every node also tracks its extent (the union of the
//! boxes of all shapes stored beneath it) and traversal prunes on that
//! extent, so the tree finds exactly what a linear scan would.

use strata_math::{Aabb, Interval, Ray, Vec3};

use crate::loaders::Line;
use crate::shape::{first_occluder, nearest_hit, HitRecord, Shape};

/// Shapes a leaf holds before it subdivides.
pub const DEFAULT_CAPACITY: usize = 16;
/// Children of a subdivided node.
pub const MAX_CHILDREN: usize = 8;
/// Depth below which leaves stop subdividing and grow past capacity.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Octree node - either a branch with eight children or a leaf with shapes.
enum OctreeNode {
    /// Subdivided node; `children[i]` covers `boundary.octant(i)`.
    Branch {
        boundary: Aabb,
        extent: Aabb,
        children: Box<[OctreeNode; MAX_CHILDREN]>,
    },
    /// Node holding shapes directly.
    Leaf {
        boundary: Aabb,
        extent: Aabb,
        shapes: Vec<Box<dyn Shape>>,
    },
}

impl OctreeNode {
    fn leaf(boundary: Aabb) -> Self {
        OctreeNode::Leaf {
            boundary,
            extent: Aabb::EMPTY,
            shapes: Vec::new(),
        }
    }

    fn boundary(&self) -> Aabb {
        match self {
            OctreeNode::Branch { boundary, .. } | OctreeNode::Leaf { boundary, .. } => *boundary,
        }
    }

    fn extent(&self) -> Aabb {
        match self {
            OctreeNode::Branch { extent, .. } | OctreeNode::Leaf { extent, .. } => *extent,
        }
    }

    fn insert(
        &mut self,
        shape: Box<dyn Shape>,
        depth: usize,
        limits: &Limits,
    ) -> Result<(), Box<dyn Shape>> {
        let centre = shape.centre();
        if !self.boundary().contains(centre) {
            return Err(shape);
        }

        match self {
            OctreeNode::Leaf { shapes, extent, .. }
                if shapes.len() < limits.capacity || depth >= limits.max_depth =>
            {
                *extent = Aabb::surrounding(extent, &shape.bounding_box());
                shapes.push(shape);
                Ok(())
            }
            OctreeNode::Leaf { .. } => {
                self.subdivide(depth, limits);
                self.insert(shape, depth, limits)
            }
            OctreeNode::Branch {
                boundary,
                extent,
                children,
            } => {
                let bbox = shape.bounding_box();
                let index = Aabb::octant_index(boundary.centre(), centre);
                children[index].insert(shape, depth + 1, limits)?;
                *extent = Aabb::surrounding(extent, &bbox);
                Ok(())
            }
        }
    }

    /// Turn a full leaf into a branch, moving its shapes into the octants.
    fn subdivide(&mut self, depth: usize, limits: &Limits) {
        let OctreeNode::Leaf {
            boundary,
            extent,
            shapes,
        } = self
        else {
            return;
        };
        let boundary = *boundary;
        let extent = *extent;
        let shapes = std::mem::take(shapes);

        let mut children: Box<[OctreeNode; MAX_CHILDREN]> =
            Box::new(std::array::from_fn(|i| OctreeNode::leaf(boundary.octant(i))));
        let split = boundary.centre();
        for shape in shapes {
            let index = Aabb::octant_index(split, shape.centre());
            // The centre was inside this node, so one octant always accepts it
            if let Err(shape) = children[index].insert(shape, depth + 1, limits) {
                log::warn!("Octree lost shape centred at {:?} while subdividing", shape.centre());
            }
        }

        *self = OctreeNode::Branch {
            boundary,
            extent,
            children,
        };
    }

    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        if !self.extent().intersects(ray, ray_t) {
            return None;
        }
        match self {
            OctreeNode::Leaf { shapes, .. } => nearest_hit(shapes, ray, ray_t),
            OctreeNode::Branch { children, .. } => {
                let mut closest: Option<HitRecord<'_>> = None;
                for child in children.iter() {
                    let interval = closest.map_or(ray_t, |rec| ray_t.with_max(rec.t));
                    if let Some(rec) = child.hit(ray, interval) {
                        closest = Some(rec);
                    }
                }
                closest
            }
        }
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<&dyn Shape> {
        if !self.extent().intersects(ray, ray_t) {
            return None;
        }
        match self {
            OctreeNode::Leaf { shapes, .. } => first_occluder(shapes, ray, ray_t),
            OctreeNode::Branch { children, .. } => {
                children.iter().find_map(|child| child.shadow_hit(ray, ray_t))
            }
        }
    }

    fn visit(&self, depth: usize, f: &mut dyn FnMut(&OctreeNode, usize)) {
        f(self, depth);
        if let OctreeNode::Branch { children, .. } = self {
            for child in children.iter() {
                child.visit(depth + 1, f);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Limits {
    capacity: usize,
    max_depth: usize,
}

/// Recursive spatial subdivision of a fixed boundary.
pub struct Octree {
    root: OctreeNode,
    limits: Limits,
    len: usize,
}

impl Octree {
    /// Create an empty octree over `boundary` with the default capacity.
    pub fn new(boundary: Aabb) -> Self {
        Self::with_capacity(boundary, DEFAULT_CAPACITY, DEFAULT_MAX_DEPTH)
    }

    /// # Panics
    /// If `capacity` is zero.
    pub fn with_capacity(boundary: Aabb, capacity: usize, max_depth: usize) -> Self {
        assert!(capacity > 0, "octree capacity must be at least 1");
        Self {
            root: OctreeNode::leaf(boundary),
            limits: Limits {
                capacity,
                max_depth,
            },
            len: 0,
        }
    }

    /// Build an octree from `shapes`, dropping those centred outside `boundary`.
    pub fn from_shapes(boundary: Aabb, shapes: Vec<Box<dyn Shape>>) -> Self {
        let mut octree = Self::new(boundary);
        let total = shapes.len();
        let mut rejected = 0;
        for shape in shapes {
            if octree.try_insert(shape).is_err() {
                rejected += 1;
            }
        }
        if rejected > 0 {
            log::warn!(
                "Octree rejected {} of {} shapes centred outside its boundary",
                rejected,
                total
            );
        }
        log::info!(
            "Built octree: {} shapes, {} nodes, depth {}",
            octree.len(),
            octree.node_count(),
            octree.depth()
        );
        octree
    }

    /// Insert a shape, handing it back if its centre lies outside the boundary.
    pub fn try_insert(&mut self, shape: Box<dyn Shape>) -> Result<(), Box<dyn Shape>> {
        self.root.insert(shape, 0, &self.limits)?;
        self.len += 1;
        Ok(())
    }

    /// Insert a shape; returns false (dropping the shape) if it was rejected.
    pub fn insert(&mut self, shape: Box<dyn Shape>) -> bool {
        self.try_insert(shape).is_ok()
    }

    pub fn boundary(&self) -> Aabb {
        self.root.boundary()
    }

    pub fn capacity(&self) -> usize {
        self.limits.capacity
    }

    /// Get the number of shapes stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree holds no shapes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes, leaves included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.root.visit(0, &mut |_, _| count += 1);
        count
    }

    /// Depth of the deepest node; a lone root leaf has depth 0.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        self.root.visit(0, &mut |_, depth| deepest = deepest.max(depth));
        deepest
    }

    /// The twelve edges of every node boundary, for debug overlays.
    pub fn bounding_lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();
        self.root
            .visit(0, &mut |node, _| lines.extend(Line::box_edges(&node.boundary())));
        lines
    }
}

impl Shape for Octree {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        self.root.hit(ray, ray_t)
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<&dyn Shape> {
        self.root.shadow_hit(ray, ray_t)
    }

    fn centre(&self) -> Vec3 {
        self.root.boundary().centre()
    }

    fn bounding_box(&self) -> Aabb {
        self.root.extent()
    }
}
