//! 数学类型
//!
//! 基于 `nalgebra` 的类型别名，以及航向旋转矩阵。

pub use nalgebra::{Matrix4 as Mat4, Vector3 as Vec3, Vector4 as Vec4};

pub type Vector3 = Vec3<f32>;
pub type Vector4 = Vec4<f32>;
pub type Matrix4 = Mat4<f32>;

/// 角度转弧度的系数
pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

/// 绕观察轴（+Z）的右手旋转
///
/// 正角度在屏幕上表现为逆时针旋转。
pub fn rotation_z_degrees(degrees: f32) -> Matrix4 {
    Matrix4::from_axis_angle(&Vector3::z_axis(), degrees * DEG_TO_RAD)
}

/// 把矩阵转换为列主序数组，供 uniform 上传
pub fn to_column_major(matrix: &Matrix4) -> [[f32; 4]; 4] {
    (*matrix).into()
}
