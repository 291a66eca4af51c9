//! KD 树 - 最近点查询
//!
//! 只写一次的结构：先通过 KdTreeBuilder 逐个插入点，
//! 再调用 balance() 生成不可变的 KdTree 后才能查询。
//!
//! 节点以隐式方式存储：每个子区间的中位元素即该区间的根，
//! 分割轴取该区间包围盒的最长轴。

use glam::Vec3;

// ============================================================================
// 查询结果
// ============================================================================

/// 最近点查询结果
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    /// 命中点坐标
    pub position: Vec3,
    /// 插入时关联的 id
    pub id: usize,
    /// 到查询点的距离平方
    pub distance_squared: f32,
}

impl Nearest {
    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance_squared.sqrt()
    }
}

// ============================================================================
// 构建器
// ============================================================================

/// KD 树构建器
#[derive(Clone, Debug, Default)]
pub struct KdTreeBuilder {
    points: Vec<(Vec3, usize)>,
}

impl KdTreeBuilder {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// 插入点
    pub fn insert(&mut self, point: Vec3, id: usize) {
        self.points.push((point, id));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 平衡并冻结
    pub fn balance(self) -> KdTree {
        let mut points = self.points;
        let mut axes = vec![0u8; points.len()];
        build_range(&mut points, &mut axes);
        KdTree { points, axes }
    }
}

impl FromIterator<(Vec3, usize)> for KdTreeBuilder {
    fn from_iter<I: IntoIterator<Item = (Vec3, usize)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// 递归排列区间：中位元素作为节点，左右子区间分别递归
fn build_range(points: &mut [(Vec3, usize)], axes: &mut [u8]) {
    if points.is_empty() {
        return;
    }

    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for (p, _) in points.iter() {
        min = min.min(*p);
        max = max.max(*p);
    }
    let extent = max - min;
    let axis = if extent.x >= extent.y && extent.x >= extent.z {
        0
    } else if extent.y >= extent.z {
        1
    } else {
        2
    };

    let mid = points.len() / 2;
    points.select_nth_unstable_by(mid, |a, b| {
        a.0[axis]
            .partial_cmp(&b.0[axis])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    axes[mid] = axis as u8;

    let (left_points, rest) = points.split_at_mut(mid);
    let (left_axes, rest_axes) = axes.split_at_mut(mid);
    build_range(left_points, left_axes);
    build_range(&mut rest[1..], &mut rest_axes[1..]);
}

// ============================================================================
// KD 树
// ============================================================================

/// 已平衡的 KD 树
#[derive(Clone, Debug)]
pub struct KdTree {
    points: Vec<(Vec3, usize)>,
    axes: Vec<u8>,
}

impl KdTree {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 查找最近点，空树返回 None
    pub fn find_nearest(&self, query: Vec3) -> Option<Nearest> {
        let mut best = None;
        self.nearest_in(0, self.points.len(), query, &mut best);
        best
    }

    /// 查找半径内的所有点，按距离升序
    pub fn find_range(&self, query: Vec3, radius: f32) -> Vec<Nearest> {
        let mut hits = Vec::new();
        self.range_in(0, self.points.len(), query, radius * radius, &mut hits);
        hits.sort_by(|a, b| {
            a.distance_squared
                .partial_cmp(&b.distance_squared)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits
    }

    fn nearest_in(&self, lo: usize, hi: usize, query: Vec3, best: &mut Option<Nearest>) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let (point, id) = self.points[mid];
        let d2 = point.distance_squared(query);
        if best.map_or(true, |b| d2 < b.distance_squared) {
            *best = Some(Nearest {
                position: point,
                id,
                distance_squared: d2,
            });
        }

        let axis = self.axes[mid] as usize;
        let diff = query[axis] - point[axis];
        let (near, far) = if diff < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        self.nearest_in(near.0, near.1, query, best);
        // 分割面距离小于当前最优时才需要检查另一侧
        if best.map_or(true, |b| diff * diff < b.distance_squared) {
            self.nearest_in(far.0, far.1, query, best);
        }
    }

    fn range_in(&self, lo: usize, hi: usize, query: Vec3, radius_sq: f32, hits: &mut Vec<Nearest>) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let (point, id) = self.points[mid];
        let d2 = point.distance_squared(query);
        if d2 <= radius_sq {
            hits.push(Nearest {
                position: point,
                id,
                distance_squared: d2,
            });
        }

        let axis = self.axes[mid] as usize;
        let diff = query[axis] - point[axis];
        if diff <= 0.0 || diff * diff <= radius_sq {
            self.range_in(lo, mid, query, radius_sq, hits);
        }
        if diff >= 0.0 || diff * diff <= radius_sq {
            self.range_in(mid + 1, hi, query, radius_sq, hits);
        }
    }
}
