//! 网格图元与细分
//!
//! create_cube 对应 bmesh.ops.create_cube，
//! subdivide_edges 对应单刀切、无平滑、仅四边形网格填充的 subdivide_edges。

use std::collections::{HashMap, HashSet};

use glam::Vec3;

use super::{edge_key, Mesh};

/// 立方体，顶点位于 (±h, ±h, ±h)，六个四边形面朝外
pub fn create_cube(name: impl Into<String>, half_extent: f32) -> Mesh {
    let h = half_extent;
    let mut mesh = Mesh::new(name);
    for &x in &[-h, h] {
        for &y in &[-h, h] {
            for &z in &[-h, h] {
                mesh.add_vertex(Vec3::new(x, y, z));
            }
        }
    }
    // 索引 = x*4 + y*2 + z（各轴负为 0、正为 1）
    mesh.add_face(vec![0, 1, 3, 2]); // -X
    mesh.add_face(vec![2, 3, 7, 6]); // +Y
    mesh.add_face(vec![6, 7, 5, 4]); // +X
    mesh.add_face(vec![4, 5, 1, 0]); // -Y
    mesh.add_face(vec![2, 6, 4, 0]); // -Z
    mesh.add_face(vec![7, 3, 1, 5]); // +Z
    mesh
}

/// 在给定边上各切一刀（中点），并重建受影响的面
///
/// - 四边全切的四边形：网格填充为 2×2，新增中心顶点
/// - 对边被切的四边形：沿切线拆为两个四边形
/// - 其他情况：中点插入面环
///
/// 新顶点的组权重取端点均值（仅当所有端点都在组内时）。
/// 返回新建的中点数。
pub fn subdivide_edges(mesh: &mut Mesh, edges: &[[u32; 2]]) -> usize {
    let mut midpoints: HashMap<[u32; 2], u32> = HashMap::new();
    for &[a, b] in edges {
        let key = edge_key(a, b);
        if key[0] == key[1] || midpoints.contains_key(&key) {
            continue;
        }
        let (pa, pb) = match (mesh.vertices.get(a as usize), mesh.vertices.get(b as usize)) {
            (Some(pa), Some(pb)) => (*pa, *pb),
            _ => continue,
        };
        let mid = mesh.add_vertex((pa + pb) * 0.5);
        interpolate_weights(mesh, mid, &[a, b]);
        midpoints.insert(key, mid);
    }

    let cut_count = midpoints.len();
    if cut_count == 0 {
        return 0;
    }

    let faces = std::mem::take(&mut mesh.faces);
    let mut new_faces = Vec::with_capacity(faces.len() * 2);

    for face in faces {
        let n = face.len();
        let cuts: Vec<Option<u32>> = (0..n)
            .map(|i| midpoints.get(&edge_key(face[i], face[(i + 1) % n])).copied())
            .collect();
        let cut_edges: HashSet<usize> = (0..n).filter(|&i| cuts[i].is_some()).collect();

        if cut_edges.is_empty() {
            new_faces.push(face);
            continue;
        }

        if n == 4 && cut_edges.len() == 4 {
            // 网格填充
            let center_pos = face
                .iter()
                .map(|&v| mesh.vertices[v as usize])
                .fold(Vec3::ZERO, |acc, p| acc + p)
                * 0.25;
            let center = mesh.add_vertex(center_pos);
            interpolate_weights(mesh, center, &face);

            let m: Vec<u32> = cuts.iter().flatten().copied().collect();
            for i in 0..4 {
                new_faces.push(vec![face[i], m[i], center, m[(i + 3) % 4]]);
            }
            continue;
        }

        if n == 4 && cut_edges.len() == 2 {
            let first = *cut_edges.iter().min().unwrap_or(&0);
            if cut_edges.contains(&(first + 2)) {
                // 旋转面环，使被切边位于 0 与 2
                let v: Vec<u32> = (0..4).map(|i| face[(first + i) % 4]).collect();
                let m0 = cuts[first].unwrap_or(v[0]);
                let m2 = cuts[(first + 2) % 4].unwrap_or(v[2]);
                new_faces.push(vec![v[0], m0, m2, v[3]]);
                new_faces.push(vec![m0, v[1], v[2], m2]);
                continue;
            }
        }

        let mut ring = Vec::with_capacity(n + cut_edges.len());
        for i in 0..n {
            ring.push(face[i]);
            if let Some(mid) = cuts[i] {
                ring.push(mid);
            }
        }
        new_faces.push(ring);
    }

    mesh.faces = new_faces;
    cut_count
}

/// 新顶点继承源顶点的平均组权重
fn interpolate_weights(mesh: &mut Mesh, target: u32, sources: &[u32]) {
    for group in mesh.groups.iter_mut() {
        let weights: Option<Vec<f32>> = sources.iter().map(|&s| group.weight(s)).collect();
        if let Some(weights) = weights {
            if !weights.is_empty() {
                let avg = weights.iter().sum::<f32>() / weights.len() as f32;
                group.set(target, avg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(mesh: &Mesh, face: &[u32]) -> Vec3 {
        let a = mesh.vertices[face[0] as usize];
        let b = mesh.vertices[face[1] as usize];
        let c = mesh.vertices[face[2] as usize];
        (b - a).cross(c - b).normalize()
    }

    #[test]
    fn test_cube_faces_point_outward() {
        let cube = create_cube("cube", 1.0);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 6);
        assert_eq!(cube.edges().len(), 12);

        for (i, face) in cube.faces.iter().enumerate() {
            let center = cube.face_center_bounds(i).unwrap();
            // 外法线与面中心同向
            assert!(face_normal(&cube, face).dot(center) > 0.9);
        }
    }

    #[test]
    fn test_grid_fill_single_quad() {
        let mut mesh = Mesh::new("quad");
        mesh.add_vertex(Vec3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Vec3::new(2.0, 0.0, 0.0));
        mesh.add_vertex(Vec3::new(2.0, 2.0, 0.0));
        mesh.add_vertex(Vec3::new(0.0, 2.0, 0.0));
        mesh.add_face(vec![0, 1, 2, 3]);
        let edges = mesh.edges();

        assert_eq!(subdivide_edges(&mut mesh, &edges), 4);
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.face_count(), 4);
        assert!(mesh.vertices.contains(&Vec3::new(1.0, 1.0, 0.0)));
        assert!(mesh.faces.iter().all(|f| f.len() == 4));
    }

    #[test]
    fn test_opposite_cut_splits_quad() {
        let mut mesh = Mesh::new("quad");
        mesh.add_vertex(Vec3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Vec3::new(2.0, 0.0, 0.0));
        mesh.add_vertex(Vec3::new(2.0, 2.0, 0.0));
        mesh.add_vertex(Vec3::new(0.0, 2.0, 0.0));
        mesh.add_face(vec![0, 1, 2, 3]);

        subdivide_edges(&mut mesh, &[[1, 2], [3, 0]]);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 2);
        for face in &mesh.faces {
            assert_eq!(face.len(), 4);
            assert!(face_normal(&mesh, face).z > 0.9);
        }
    }

    #[test]
    fn test_single_cut_inserts_into_ring() {
        let mut mesh = Mesh::new("tri");
        mesh.add_vertex(Vec3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Vec3::new(2.0, 0.0, 0.0));
        mesh.add_vertex(Vec3::new(0.0, 2.0, 0.0));
        mesh.add_face(vec![0, 1, 2]);
        mesh.groups.ensure("stiff").add(&[0, 1], 1.0, crate::mesh::WeightMode::Replace);

        subdivide_edges(&mut mesh, &[[0, 1]]);
        assert_eq!(mesh.faces, vec![vec![0, 3, 1, 2]]);
        // 中点继承两端权重
        assert_eq!(mesh.groups.get("stiff").and_then(|g| g.weight(3)), Some(1.0));
    }
}
