//! Generic packed point-cloud message.
//!
//! Mirrors the usual sensor wire layout: a field table describing where each
//! channel sits inside a fixed-size point record, followed by raw bytes.
//! Only `x`, `y`, `z` (float32 or float64) and an optional packed `rgb` /
//! `rgba` channel (float32 bit pattern or uint32) are decoded.

use serde::{Deserialize, Serialize};

use crate::core::types::{FrameHeader, PointCloud, PointXYZRGB, Rgb};
use crate::error::{Error, Result};

/// Datatype of one point field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PointFieldType {
    Int8 = 1,
    Uint8 = 2,
    Int16 = 3,
    Uint16 = 4,
    Int32 = 5,
    Uint32 = 6,
    Float32 = 7,
    Float64 = 8,
}

impl PointFieldType {
    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }
}

/// One channel of a point record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointField {
    pub name: String,
    /// Byte offset inside the point record
    pub offset: u32,
    pub datatype: PointFieldType,
    /// Number of elements (1 for scalar channels)
    pub count: u32,
}

impl PointField {
    /// Create a scalar field.
    pub fn new(name: impl Into<String>, offset: u32, datatype: PointFieldType) -> Self {
        Self {
            name: name.into(),
            offset,
            datatype,
            count: 1,
        }
    }

    fn end(&self) -> usize {
        self.offset as usize + self.datatype.size() * self.count.max(1) as usize
    }
}

/// Packed point-cloud message as delivered by a depth sensor driver.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointCloudMsg {
    pub header: FrameHeader,
    /// Rows (1 for unorganised clouds)
    pub height: u32,
    /// Points per row
    pub width: u32,
    pub fields: Vec<PointField>,
    pub is_bigendian: bool,
    /// Bytes per point record
    pub point_step: u32,
    /// Bytes per row
    pub row_step: u32,
    pub data: Vec<u8>,
    /// True when no point contains non-finite values
    pub is_dense: bool,
}

impl PointCloudMsg {
    /// Number of point records described by the header.
    pub fn point_count(&self) -> usize {
        self.height as usize * self.width as usize
    }

    fn field(&self, name: &str) -> Option<&PointField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn coordinate_field(&self, name: &str) -> Result<&PointField> {
        let field = self
            .field(name)
            .ok_or_else(|| Error::InvalidMessage(format!("missing field '{name}'")))?;
        match field.datatype {
            PointFieldType::Float32 | PointFieldType::Float64 => Ok(field),
            other => Err(Error::InvalidMessage(format!(
                "field '{name}' has unsupported datatype {other:?}"
            ))),
        }
    }

    /// Decode into a typed cloud.
    ///
    /// Fails on a missing coordinate channel, a field that overruns the
    /// point record, or a payload shorter than the header claims. Non-finite
    /// points are kept; the region-of-interest filter drops them.
    pub fn to_cloud(&self) -> Result<PointCloud> {
        let fx = self.coordinate_field("x")?;
        let fy = self.coordinate_field("y")?;
        let fz = self.coordinate_field("z")?;
        let frgb = self
            .field("rgb")
            .or_else(|| self.field("rgba"))
            .filter(|f| matches!(f.datatype, PointFieldType::Float32 | PointFieldType::Uint32));

        let step = self.point_step as usize;
        for field in [Some(fx), Some(fy), Some(fz), frgb].into_iter().flatten() {
            if field.end() > step {
                return Err(Error::InvalidMessage(format!(
                    "field '{}' ends at byte {} beyond point_step {}",
                    field.name,
                    field.end(),
                    step
                )));
            }
        }

        let rows = self.height as usize;
        let cols = self.width as usize;
        let overflow = || {
            Error::InvalidMessage(format!(
                "header {}x{} with point_step {} and row_step {} overflows",
                self.height, self.width, self.point_step, self.row_step
            ))
        };
        let packed_row = cols.checked_mul(step).ok_or_else(overflow)?;
        let row_step = (self.row_step as usize).max(packed_row);
        let n_points = rows.checked_mul(cols).ok_or_else(overflow)?;
        let needed = if n_points == 0 {
            0
        } else {
            (rows - 1)
                .checked_mul(row_step)
                .and_then(|n| n.checked_add(packed_row))
                .ok_or_else(overflow)?
        };
        if self.data.len() < needed {
            return Err(Error::InvalidMessage(format!(
                "payload has {} bytes, expected at least {}",
                self.data.len(),
                needed
            )));
        }

        let mut cloud = PointCloud::with_capacity(self.header.clone(), n_points);
        for row in 0..rows {
            for col in 0..cols {
                let start = row * row_step + col * step;
                let record = &self.data[start..start + step];
                let mut point = PointXYZRGB::new(
                    self.read_coordinate(record, fx),
                    self.read_coordinate(record, fy),
                    self.read_coordinate(record, fz),
                );
                if let Some(f) = frgb {
                    point.color = Some(Rgb::from_packed(self.read_u32(record, f.offset as usize)));
                }
                cloud.push(point);
            }
        }
        Ok(cloud)
    }

    /// Encode a typed cloud as an unorganised message with float32 `x y z`
    /// and, if any point carries colour, a packed float32 `rgb` channel.
    pub fn from_cloud(cloud: &PointCloud) -> Self {
        let with_color = cloud.iter().any(|p| p.color.is_some());
        let mut fields = vec![
            PointField::new("x", 0, PointFieldType::Float32),
            PointField::new("y", 4, PointFieldType::Float32),
            PointField::new("z", 8, PointFieldType::Float32),
        ];
        let point_step: u32 = if with_color {
            fields.push(PointField::new("rgb", 12, PointFieldType::Float32));
            16
        } else {
            12
        };

        let mut data = Vec::with_capacity(cloud.len() * point_step as usize);
        for p in cloud.iter() {
            data.extend_from_slice(&p.x.to_le_bytes());
            data.extend_from_slice(&p.y.to_le_bytes());
            data.extend_from_slice(&p.z.to_le_bytes());
            if with_color {
                let packed = p.color.map(|c| c.packed()).unwrap_or(0);
                data.extend_from_slice(&packed.to_le_bytes());
            }
        }

        Self {
            header: cloud.header.clone(),
            height: 1,
            width: cloud.len() as u32,
            fields,
            is_bigendian: false,
            point_step,
            row_step: point_step * cloud.len() as u32,
            data,
            is_dense: cloud.iter().all(|p| p.is_finite()),
        }
    }

    fn read_coordinate(&self, record: &[u8], field: &PointField) -> f32 {
        let offset = field.offset as usize;
        match field.datatype {
            PointFieldType::Float64 => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&record[offset..offset + 8]);
                let value = if self.is_bigendian {
                    f64::from_be_bytes(bytes)
                } else {
                    f64::from_le_bytes(bytes)
                };
                value as f32
            }
            _ => f32::from_bits(self.read_u32(record, offset)),
        }
    }

    fn read_u32(&self, record: &[u8], offset: usize) -> u32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&record[offset..offset + 4]);
        if self.is_bigendian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        }
    }
}

impl From<&PointCloud> for PointCloudMsg {
    fn from(cloud: &PointCloud) -> Self {
        Self::from_cloud(cloud)
    }
}
