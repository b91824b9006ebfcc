//! Quad tree spatial partitioning over the X-Z plane
//!
//! Built once from a complete object set: objects are accumulated into the
//! root, then [`QuadTree::init`] subdivides recursively. Afterwards single
//! objects can be removed or inserted without a rebuild.
//!
//! Each leaf's region may grow after construction, but never beyond
//! `growth_factor` times the size it had when it was initialized. Objects
//! that straddle quadrant boundaries stay in the coarser leaf.

use crate::config::QuadTreeConfig;
use crate::foundation::collections::ObjectKey;
use crate::foundation::math::{Vec2, Vec3};
use crate::scene::AABB;
use crate::spatial::ObjectBounds;

/// Child slot of a subdivided leaf, X as the horizontal axis and Z as the vertical
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// Min X, min Z
    BottomLeft = 0,
    /// Max X, min Z
    BottomRight = 1,
    /// Min X, max Z
    TopLeft = 2,
    /// Max X, max Z
    TopRight = 3,
}

impl Quadrant {
    /// All quadrants in insertion-attempt order
    pub const ALL: [Quadrant; 4] = [
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
        Quadrant::TopLeft,
        Quadrant::TopRight,
    ];

    /// Region of `parent` covered by this quadrant when split at `center`
    fn region(self, parent: &AABB, center: Vec3) -> AABB {
        let (min, max) = (parent.min(), parent.max());
        let (x0, x1) = match self {
            Quadrant::BottomLeft | Quadrant::TopLeft => (min.x, center.x),
            Quadrant::BottomRight | Quadrant::TopRight => (center.x, max.x),
        };
        let (z0, z1) = match self {
            Quadrant::BottomLeft | Quadrant::BottomRight => (min.z, center.z),
            Quadrant::TopLeft | Quadrant::TopRight => (center.z, max.z),
        };
        AABB::new(Vec3::new(x0, min.y, z0), Vec3::new(x1, max.y, z1))
    }
}

/// Where [`QuadTree::insert`] put an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// A leaf at this level accepted it within its growth caps
    Accepted {
        /// Level of the accepting leaf
        level: u8,
    },
    /// No leaf accepted it; it was stored in the root regardless of caps
    RootFallback,
}

/// One node of the quad tree
///
/// Objects live in exactly one leaf's list. Non-terminal leaves keep the
/// objects none of their children would take.
#[derive(Debug, Clone)]
pub struct QuadTreeLeaf {
    level: u8,
    bounds: Option<AABB>,
    objects: Vec<ObjectKey>,
    children: [Option<Box<QuadTreeLeaf>>; 4],
    max_size_x: f32,
    max_size_z: f32,
    corners: [Vec2; 4],
}

impl Default for QuadTreeLeaf {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadTreeLeaf {
    /// Empty root leaf with no region yet
    pub fn new() -> Self {
        Self {
            level: 0,
            bounds: None,
            objects: Vec::new(),
            children: [None, None, None, None],
            max_size_x: 0.0,
            max_size_z: 0.0,
            corners: [Vec2::zeros(); 4],
        }
    }

    /// Leaf pre-assigned to `region`, capped relative to that region
    fn with_region(level: u8, region: AABB, growth_factor: f32) -> Self {
        let size = region.size();
        Self {
            level,
            bounds: Some(region),
            objects: Vec::new(),
            children: [None, None, None, None],
            max_size_x: size.x * growth_factor,
            max_size_z: size.z * growth_factor,
            corners: region.corners_2d(),
        }
    }

    /// Depth of this leaf (root is 0)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Region covering every object in this subtree
    pub fn bounds(&self) -> Option<&AABB> {
        self.bounds.as_ref()
    }

    /// Objects stored directly in this leaf
    pub fn objects(&self) -> &[ObjectKey] {
        &self.objects
    }

    /// Child in a given quadrant
    pub fn child(&self, quadrant: Quadrant) -> Option<&QuadTreeLeaf> {
        self.children[quadrant as usize].as_deref()
    }

    /// Present children, in quadrant order
    pub fn children(&self) -> impl Iterator<Item = &QuadTreeLeaf> {
        self.children.iter().flatten().map(|child| &**child)
    }

    /// True when no child slot is occupied
    pub fn is_terminal(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    /// Growth caps on the X and Z extents of this leaf's region
    pub fn max_size(&self) -> (f32, f32) {
        (self.max_size_x, self.max_size_z)
    }

    /// Cached X-Z corners of the region, in [`AABB::corners_2d`] order
    pub fn corners(&self) -> &[Vec2; 4] {
        &self.corners
    }

    fn set_bounds(&mut self, bounds: AABB) {
        self.bounds = Some(bounds);
        self.corners = bounds.corners_2d();
    }

    fn include(&mut self, aabb: &AABB) {
        let grown = match self.bounds {
            Some(bounds) => bounds.union(aabb),
            None => *aabb,
        };
        self.set_bounds(grown);
    }

    /// Accumulation phase: grow to cover `aabb` and store the object here
    pub fn add_object(&mut self, key: ObjectKey, aabb: &AABB) {
        self.include(aabb);
        self.objects.push(key);
    }

    /// Subdivide recursively; call once after accumulation
    pub fn init(&mut self, source: &impl ObjectBounds, config: &QuadTreeConfig) {
        let Some(bounds) = self.bounds else {
            return;
        };

        let size = bounds.size();
        self.max_size_x = size.x * config.growth_factor;
        self.max_size_z = size.z * config.growth_factor;
        self.corners = bounds.corners_2d();

        if self.objects.len() <= config.min_objects_per_leaf
            || self.level > config.max_level
            || self.level == u8::MAX
        {
            return;
        }

        let center = bounds.center();
        let mut children = Quadrant::ALL.map(|quadrant| {
            QuadTreeLeaf::with_region(self.level + 1, quadrant.region(&bounds, center), config.growth_factor)
        });

        for key in std::mem::take(&mut self.objects) {
            let accepted = match source.object_aabb(key) {
                Some(aabb) => children.iter_mut().any(|child| child.try_to_insert_object(key, &aabb)),
                None => {
                    log::warn!("Quad tree object {:?} has no bounds; keeping it at level {}", key, self.level);
                    false
                }
            };
            if !accepted {
                self.objects.push(key);
            }
        }

        for (slot, mut child) in self.children.iter_mut().zip(children) {
            *slot = if child.objects.is_empty() {
                None
            } else {
                child.init(source, config);
                Some(Box::new(child))
            };
        }

        log::trace!(
            "Quad tree leaf at level {} kept {} objects, {} children",
            self.level,
            self.objects.len(),
            self.children().count()
        );
    }

    /// Store `key` here if it fits this leaf's region policy
    ///
    /// Rejected when the object pokes out of the region while its center is
    /// inside, or when covering it would push the region past its caps.
    /// Accepted objects stay in this leaf's own list.
    pub fn try_to_insert_object(&mut self, key: ObjectKey, aabb: &AABB) -> bool {
        let Some(bounds) = self.bounds else {
            return false;
        };

        if !aabb.is_inside_2d(&bounds) && bounds.contains_point_2d(aabb.center_2d()) {
            return false;
        }

        let grown = bounds.union(aabb);
        if !self.within_caps(&grown) {
            return false;
        }

        self.set_bounds(grown);
        self.objects.push(key);
        true
    }

    fn within_caps(&self, region: &AABB) -> bool {
        let size = region.size();
        size.x <= self.max_size_x && size.z <= self.max_size_z
    }

    /// Try the subtree bottom-up: children first, then this leaf
    ///
    /// A leaf that cannot grow to cover `aabb` within its caps rejects the
    /// object for its whole subtree, since any acceptance below would grow it.
    fn insert_deepest(&mut self, key: ObjectKey, aabb: &AABB) -> Option<u8> {
        let bounds = self.bounds?;
        if !self.within_caps(&bounds.union(aabb)) {
            return None;
        }

        let accepted = self
            .children
            .iter_mut()
            .flatten()
            .find_map(|child| child.insert_deepest(key, aabb));

        match accepted {
            Some(level) => {
                // A child may grow past this leaf's region
                self.include(aabb);
                Some(level)
            }
            None => self.try_to_insert_object(key, aabb).then_some(self.level),
        }
    }

    /// Remove `key` from this leaf or any descendant
    ///
    /// Regions are not shrunk afterwards.
    pub fn remove_object(&mut self, key: ObjectKey) -> bool {
        if let Some(index) = self.objects.iter().position(|&k| k == key) {
            self.objects.swap_remove(index);
            return true;
        }

        self.children
            .iter_mut()
            .flatten()
            .any(|child| child.remove_object(key))
    }

    /// Whether `key` is stored anywhere in this subtree
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains(&key) || self.children().any(|child| child.contains(key))
    }

    /// Objects stored in this subtree
    pub fn object_count(&self) -> usize {
        self.objects.len() + self.children().map(QuadTreeLeaf::object_count).sum::<usize>()
    }

    /// Deepest level present in this subtree
    pub fn depth(&self) -> u8 {
        self.children().map(QuadTreeLeaf::depth).max().unwrap_or(self.level)
    }

    /// Visit this leaf and every descendant, parents before children
    pub fn visit(&self, visitor: &mut impl FnMut(&QuadTreeLeaf)) {
        visitor(self);
        for child in self.children() {
            child.visit(visitor);
        }
    }

    fn overlaps_2d(&self, region: &AABB) -> bool {
        if self.bounds.is_none() {
            return false;
        }
        let [low, _, _, high] = self.corners;
        let (min, max) = (region.min(), region.max());
        !(max.x < low.x || min.x > high.x || max.z < low.y || min.z > high.y)
    }

    fn query_region_2d(&self, region: &AABB, results: &mut Vec<ObjectKey>) {
        if !self.overlaps_2d(region) {
            return;
        }
        results.extend_from_slice(&self.objects);
        for child in self.children() {
            child.query_region_2d(region, results);
        }
    }
}

/// Quad tree: root leaf plus its build parameters
#[derive(Debug, Clone, Default)]
pub struct QuadTree {
    root: QuadTreeLeaf,
    config: QuadTreeConfig,
    initialized: bool,
}

impl QuadTree {
    /// Create an empty tree
    pub fn new(config: QuadTreeConfig) -> Self {
        Self {
            root: QuadTreeLeaf::new(),
            config,
            initialized: false,
        }
    }

    /// Build parameters
    pub fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    /// Root leaf, for external traversal
    pub fn root(&self) -> &QuadTreeLeaf {
        &self.root
    }

    /// Whether [`init`](Self::init) has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Accumulate an object into the root before [`init`](Self::init)
    ///
    /// Returns false if `source` has no bounds for `key`.
    pub fn add_object(&mut self, source: &impl ObjectBounds, key: ObjectKey) -> bool {
        debug_assert!(!self.initialized, "objects must be added before init");
        match source.object_aabb(key) {
            Some(aabb) => {
                self.root.add_object(key, &aabb);
                true
            }
            None => false,
        }
    }

    /// Subdivide the accumulated objects
    pub fn init(&mut self, source: &impl ObjectBounds) {
        debug_assert!(!self.initialized, "quad tree initialized twice");
        self.root.init(source, &self.config);
        self.initialized = true;
        log::debug!(
            "Built quad tree: {} objects, depth {}, {} leaves",
            self.object_count(),
            self.depth(),
            self.leaf_count()
        );
    }

    /// Insert one object after the build
    ///
    /// The deepest leaf that accepts the object keeps it, provided every
    /// leaf above it can grow to cover it within its caps. Otherwise it is
    /// stored in the root, whose region grows to match. `key` must not
    /// already be in the tree.
    /// Before [`init`](Self::init) this is plain accumulation.
    pub fn insert(&mut self, source: &impl ObjectBounds, key: ObjectKey) -> Option<Insertion> {
        debug_assert!(!self.contains(key), "{key:?} is already in the quad tree");
        let aabb = source.object_aabb(key)?;

        if !self.initialized {
            self.root.add_object(key, &aabb);
            return Some(Insertion::Accepted { level: 0 });
        }

        if let Some(level) = self.root.insert_deepest(key, &aabb) {
            return Some(Insertion::Accepted { level });
        }

        log::debug!("No quad tree leaf accepted {:?}; storing it in the root", key);
        self.root.add_object(key, &aabb);
        Some(Insertion::RootFallback)
    }

    /// Remove an object; false if it is not in the tree
    pub fn remove_object(&mut self, key: ObjectKey) -> bool {
        self.root.remove_object(key)
    }

    /// Whether `key` is stored in the tree
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.root.contains(key)
    }

    /// Objects stored in the tree
    pub fn object_count(&self) -> usize {
        self.root.object_count()
    }

    /// Deepest leaf level
    pub fn depth(&self) -> u8 {
        self.root.depth()
    }

    /// Number of leaves with no children
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.root.visit(&mut |leaf| {
            if leaf.is_terminal() {
                count += 1;
            }
        });
        count
    }

    /// Objects in every leaf whose X-Z region overlaps `region`
    ///
    /// This is a coarse candidate set; callers test the objects themselves.
    pub fn query_region_2d(&self, region: &AABB) -> Vec<ObjectKey> {
        let mut results = Vec::new();
        self.root.query_region_2d(region, &mut results);
        results
    }

    /// Drop every leaf and start a new accumulation phase
    pub fn clear(&mut self) {
        self.root = QuadTreeLeaf::new();
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::{SecondaryMap, SlotMap};

    struct Fixture {
        keys: SlotMap<ObjectKey, ()>,
        bounds: SecondaryMap<ObjectKey, AABB>,
    }

    impl Fixture {
        fn new() -> Self {
            Self { keys: SlotMap::with_key(), bounds: SecondaryMap::new() }
        }

        fn add(&mut self, min: (f32, f32), max: (f32, f32)) -> ObjectKey {
            let key = self.keys.insert(());
            let aabb = AABB::new(Vec3::new(min.0, 0.0, min.1), Vec3::new(max.0, 1.0, max.1));
            self.bounds.insert(key, aabb);
            key
        }

        fn unit_at(&mut self, x: f32, z: f32) -> ObjectKey {
            self.add((x - 0.5, z - 0.5), (x + 0.5, z + 0.5))
        }

        fn build(&self, config: QuadTreeConfig) -> QuadTree {
            let mut tree = QuadTree::new(config);
            for key in self.keys.keys() {
                assert!(tree.add_object(&self.bounds, key));
            }
            tree.init(&self.bounds);
            tree
        }
    }

    fn grid(fixture: &mut Fixture, columns: u32, rows: u32, spacing: f32) -> Vec<ObjectKey> {
        let mut keys = Vec::new();
        for i in 0..columns {
            for j in 0..rows {
                keys.push(fixture.unit_at(spacing * (i as f32 + 0.5), spacing * (j as f32 + 0.5)));
            }
        }
        keys
    }

    #[test]
    fn test_small_set_stays_in_root() {
        let mut fixture = Fixture::new();
        grid(&mut fixture, 5, 1, 10.0);
        let tree = fixture.build(QuadTreeConfig::default());

        assert!(tree.root().is_terminal());
        assert_eq!(tree.root().objects().len(), 5);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn test_accumulation_grows_root() {
        let mut fixture = Fixture::new();
        fixture.unit_at(0.0, 0.0);
        fixture.unit_at(10.0, -4.0);
        let tree = fixture.build(QuadTreeConfig::default());

        let bounds = tree.root().bounds().unwrap();
        assert_eq!(bounds.min(), Vec3::new(-0.5, 0.0, -4.5));
        assert_eq!(bounds.max(), Vec3::new(10.5, 1.0, 0.5));
        assert_eq!(tree.root().max_size(), (16.5, 7.5));
    }

    #[test]
    fn test_every_object_in_exactly_one_leaf() {
        let mut fixture = Fixture::new();
        let keys = grid(&mut fixture, 8, 8, 4.0);
        let tree = fixture.build(QuadTreeConfig::default());

        let mut seen: Vec<ObjectKey> = Vec::new();
        tree.root().visit(&mut |leaf| seen.extend_from_slice(leaf.objects()));

        assert_eq!(seen.len(), keys.len());
        for key in &keys {
            assert_eq!(seen.iter().filter(|k| *k == key).count(), 1);
        }
        assert!(tree.depth() >= 1);
    }

    #[test]
    fn test_leaf_regions_contain_their_objects() {
        let mut fixture = Fixture::new();
        grid(&mut fixture, 7, 5, 3.0);
        fixture.add((1.0, 1.0), (9.0, 2.0));
        let tree = fixture.build(QuadTreeConfig::default());

        tree.root().visit(&mut |leaf| {
            let region = leaf.bounds().unwrap();
            for key in leaf.objects() {
                assert!(fixture.bounds[*key].is_inside_2d(region));
            }
            for child in leaf.children() {
                assert!(child.bounds().unwrap().is_inside_2d(region));
            }
        });
    }

    #[test]
    fn test_empty_children_are_pruned() {
        let mut fixture = Fixture::new();
        // Everything crowded into the min-X, min-Z corner of a wide region
        for i in 0..8 {
            fixture.unit_at(i as f32 * 0.1, 0.0);
        }
        fixture.unit_at(100.0, 100.0);
        let tree = fixture.build(QuadTreeConfig::default());

        tree.root().visit(&mut |leaf| {
            if leaf.level() > 0 {
                assert!(leaf.object_count() > 0);
            }
        });
        assert!(tree.root().child(Quadrant::BottomLeft).is_some());
    }

    #[test]
    fn test_straddling_object_stays_coarse() {
        let mut fixture = Fixture::new();
        grid(&mut fixture, 4, 4, 10.0);
        // Centered on the split point and wider than any quadrant may grow
        let straddler = fixture.add((6.0, 6.0), (34.0, 34.0));
        let tree = fixture.build(QuadTreeConfig::default());

        assert!(tree.root().objects().contains(&straddler));
    }

    #[test]
    fn test_center_inside_but_poking_out_is_rejected() {
        let mut fixture = Fixture::new();
        let region = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 1.0, 10.0));
        let mut leaf = QuadTreeLeaf::with_region(1, region, 1.5);

        let poking = fixture.add((8.0, 4.0), (12.0, 6.0));
        let beside = fixture.add((11.0, 4.0), (12.0, 6.0));
        let inside = fixture.add((2.0, 2.0), (3.0, 3.0));

        assert!(!leaf.try_to_insert_object(poking, &fixture.bounds[poking]));
        assert!(leaf.try_to_insert_object(beside, &fixture.bounds[beside]));
        assert!(leaf.try_to_insert_object(inside, &fixture.bounds[inside]));
        assert_eq!(leaf.bounds().unwrap().max().x, 12.0);
        assert_eq!(leaf.objects(), &[beside, inside]);
    }

    #[test]
    fn test_growth_cap_rejects() {
        let mut fixture = Fixture::new();
        let region = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 1.0, 10.0));
        let mut leaf = QuadTreeLeaf::with_region(1, region, 1.5);

        let far = fixture.add((20.0, 2.0), (21.0, 3.0));
        assert!(!leaf.try_to_insert_object(far, &fixture.bounds[far]));
        assert_eq!(leaf.bounds(), Some(&region));
        assert!(leaf.objects().is_empty());
    }

    #[test]
    fn test_oversized_insert_falls_back_to_root() {
        let mut fixture = Fixture::new();
        grid(&mut fixture, 6, 6, 5.0);
        let mut tree = fixture.build(QuadTreeConfig::default());

        let huge = fixture.add((-500.0, -500.0), (500.0, 500.0));
        let aabb = fixture.bounds[huge];

        // Every leaf rejects it on its own
        let mut probe = tree.clone();
        let mut rejected_everywhere = true;
        fn probe_all(leaf: &mut QuadTreeLeaf, key: ObjectKey, aabb: &AABB, ok: &mut bool) {
            if leaf.try_to_insert_object(key, aabb) {
                *ok = false;
            }
            for child in leaf.children.iter_mut().flatten() {
                probe_all(child, key, aabb, ok);
            }
        }
        probe_all(&mut probe.root, huge, &aabb, &mut rejected_everywhere);
        assert!(rejected_everywhere);

        assert_eq!(tree.insert(&fixture.bounds, huge), Some(Insertion::RootFallback));
        assert!(tree.root().objects().contains(&huge));
        assert!(aabb.is_inside_2d(tree.root().bounds().unwrap()));
    }

    /// Root over [0, 100] with two children already grown past their quadrants
    fn widened_tree() -> QuadTree {
        let region = |x0: f32, x1: f32, z1: f32| AABB::new(Vec3::new(x0, 0.0, 0.0), Vec3::new(x1, 1.0, z1));
        let mut root = QuadTreeLeaf::with_region(0, region(0.0, 100.0, 100.0), 1.5);
        root.children[Quadrant::BottomLeft as usize] =
            Some(Box::new(QuadTreeLeaf::with_region(1, region(0.0, 60.0, 50.0), 1.5)));
        root.children[Quadrant::BottomRight as usize] =
            Some(Box::new(QuadTreeLeaf::with_region(1, region(40.0, 100.0, 50.0), 1.5)));
        QuadTree { root, config: QuadTreeConfig::default(), initialized: true }
    }

    #[test]
    fn test_insert_respects_ancestor_caps() {
        let mut fixture = Fixture::new();
        let mut tree = widened_tree();
        assert_eq!(tree.root().max_size(), (150.0, 150.0));

        let left = fixture.add((-29.0, 10.0), (-28.0, 11.0));
        assert_eq!(tree.insert(&fixture.bounds, left), Some(Insertion::Accepted { level: 1 }));
        assert_eq!(tree.root().bounds().unwrap().size().x, 129.0);

        // Bottom-right could take it, but the root would grow to 158
        let right = fixture.add((128.0, 10.0), (129.0, 11.0));
        assert_eq!(tree.insert(&fixture.bounds, right), Some(Insertion::RootFallback));
        assert!(tree.root().objects().contains(&right));

        let bottom_right = tree.root().child(Quadrant::BottomRight).unwrap();
        assert!(bottom_right.objects().is_empty());
        assert_eq!(bottom_right.bounds().unwrap().max().x, 100.0);
        tree.root().visit(&mut |leaf| {
            if leaf.level() > 0 {
                let size = leaf.bounds().unwrap().size();
                let (cap_x, cap_z) = leaf.max_size();
                assert!(size.x <= cap_x && size.z <= cap_z, "level {} leaf past its caps", leaf.level());
            }
        });
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "is already in the quad tree")]
    fn test_double_insert_asserts() {
        let mut fixture = Fixture::new();
        grid(&mut fixture, 4, 4, 5.0);
        let mut tree = fixture.build(QuadTreeConfig::default());
        let key = fixture.keys.keys().next().unwrap();
        tree.insert(&fixture.bounds, key);
    }

    #[test]
    fn test_dynamic_insert_prefers_deep_leaf() {
        let mut fixture = Fixture::new();
        grid(&mut fixture, 8, 8, 4.0);
        let mut tree = fixture.build(QuadTreeConfig::default());
        let before = tree.object_count();

        let small = fixture.unit_at(1.0, 1.0);
        match tree.insert(&fixture.bounds, small) {
            Some(Insertion::Accepted { level }) => assert!(level >= 1),
            other => panic!("expected acceptance, got {other:?}"),
        }
        assert_eq!(tree.object_count(), before + 1);
        assert!(tree.contains(small));
    }

    #[test]
    fn test_remove_object() {
        let mut fixture = Fixture::new();
        let keys = grid(&mut fixture, 6, 6, 5.0);
        let mut tree = fixture.build(QuadTreeConfig::default());

        for key in &keys {
            assert!(tree.remove_object(*key));
            assert!(!tree.remove_object(*key));
        }
        assert_eq!(tree.object_count(), 0);
    }

    #[test]
    fn test_max_level_stops_recursion() {
        let mut fixture = Fixture::new();
        for _ in 0..20 {
            fixture.unit_at(1.0, 1.0);
        }
        fixture.unit_at(50.0, 50.0);
        let config = QuadTreeConfig { max_level: 2, ..QuadTreeConfig::default() };
        let tree = fixture.build(config);

        assert!(tree.depth() <= 3);
        assert_eq!(tree.object_count(), 21);
    }

    #[test]
    fn test_region_query() {
        let mut fixture = Fixture::new();
        let keys = grid(&mut fixture, 8, 8, 4.0);
        let tree = fixture.build(QuadTreeConfig::default());

        let region = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(3.0, 1.0, 3.0));
        let found = tree.query_region_2d(&region);
        assert!(found.contains(&keys[0]));

        let nowhere = AABB::new(Vec3::new(1000.0, 0.0, 1000.0), Vec3::new(1001.0, 1.0, 1001.0));
        assert!(tree.query_region_2d(&nowhere).is_empty());
    }

    #[test]
    fn test_missing_bounds_keep_object_coarse() {
        let mut fixture = Fixture::new();
        let keys = grid(&mut fixture, 4, 4, 5.0);
        let mut tree = QuadTree::new(QuadTreeConfig::default());
        for key in &keys {
            tree.add_object(&fixture.bounds, *key);
        }
        fixture.bounds.remove(keys[3]);
        tree.init(&fixture.bounds);

        assert!(tree.root().objects().contains(&keys[3]));
        assert_eq!(tree.object_count(), keys.len());
    }

    #[test]
    fn test_clear_resets() {
        let mut fixture = Fixture::new();
        grid(&mut fixture, 4, 4, 5.0);
        let mut tree = fixture.build(QuadTreeConfig::default());
        tree.clear();

        assert!(!tree.is_initialized());
        assert_eq!(tree.object_count(), 0);
        assert!(tree.root().bounds().is_none());
    }
}
