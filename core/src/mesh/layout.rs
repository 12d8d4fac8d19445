//! Vertex and face record layouts.
//!
//! A [`VertexLayout`] is an ordered list of named scalar fields with byte
//! offsets. Every field in one layout shares the same [`ScalarType`], so a
//! vertex record is `stride / scalar.size()` scalars packed back to back.
//! Fields are grouped by [`VertexAttributeSemantic`]; appending an attribute
//! appends all of its components at the current end of the record.
//!
//! # Example
//!
//! ```ignore
//! let layout = VertexLayout::new(ScalarType::Float32)
//!     .with_attribute(VertexAttributeSemantic::Position)
//!     .with_attribute(VertexAttributeSemantic::Normal)
//!     .with_attribute(VertexAttributeSemantic::TexCoord);
//!
//! assert_eq!(layout.stride(), 32);
//! assert_eq!(layout.offset_of("nx"), Some(12));
//! assert_eq!(layout.offset_of("u"), Some(24));
//! ```

/// Scalar type of every field in a vertex layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalarType {
    /// 32-bit IEEE float.
    #[default]
    Float32,
    /// 64-bit IEEE float.
    Float64,
}

impl ScalarType {
    /// Size in bytes of one scalar.
    pub fn size(&self) -> usize {
        match self {
            Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }
}

/// Index format of a face record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    /// 32-bit unsigned integers.
    #[default]
    Uint32,
    /// 64-bit unsigned integers (more than `u32::MAX` vertices).
    Uint64,
}

impl IndexFormat {
    /// Get the size in bytes of each index.
    pub fn size(&self) -> usize {
        match self {
            Self::Uint32 => 4,
            Self::Uint64 => 8,
        }
    }

    /// The narrowest format able to address `vertex_count` vertices.
    pub fn for_vertex_count(vertex_count: u64) -> Self {
        if vertex_count > u64::from(u32::MAX) {
            Self::Uint64
        } else {
            Self::Uint32
        }
    }
}

/// Semantic meaning of a group of vertex fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeSemantic {
    /// Vertex position (`x y z`).
    Position,
    /// Vertex normal (`nx ny nz`).
    Normal,
    /// Texture coordinates (`u v`).
    TexCoord,
    /// Vertex color (`r g b`).
    Color,
}

impl VertexAttributeSemantic {
    /// Field names of this attribute, in record order.
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            Self::Position => &["x", "y", "z"],
            Self::Normal => &["nx", "ny", "nz"],
            Self::TexCoord => &["u", "v"],
            Self::Color => &["r", "g", "b"],
        }
    }

    /// Number of scalar components.
    pub fn dimension(&self) -> usize {
        self.field_names().len()
    }
}

/// One named scalar field of a vertex record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexField {
    /// Field name (`"x"`, `"nx"`, `"u"`, ...).
    pub name: &'static str,
    /// Attribute this field belongs to.
    pub semantic: VertexAttributeSemantic,
    /// Byte offset within the record.
    pub offset: u32,
}

/// Layout of one vertex record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    scalar: ScalarType,
    fields: Vec<VertexField>,
    /// Optional label for debugging.
    pub label: Option<String>,
}

impl VertexLayout {
    /// Create an empty layout whose fields will use `scalar`.
    pub fn new(scalar: ScalarType) -> Self {
        Self {
            scalar,
            fields: Vec::new(),
            label: None,
        }
    }

    /// Append every component of `semantic` at the end of the record.
    ///
    /// Appending a semantic that is already present is ignored.
    pub fn with_attribute(mut self, semantic: VertexAttributeSemantic) -> Self {
        if self.has_semantic(semantic) {
            log::warn!("vertex layout already has {semantic:?}, ignoring");
            return self;
        }
        let size = self.scalar.size() as u32;
        let mut offset = self.stride();
        for &name in semantic.field_names() {
            self.fields.push(VertexField {
                name,
                semantic,
                offset,
            });
            offset += size;
        }
        self
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Scalar type shared by all fields.
    pub fn scalar(&self) -> ScalarType {
        self.scalar
    }

    /// All fields in record order.
    pub fn fields(&self) -> &[VertexField] {
        &self.fields
    }

    /// Record size in bytes.
    pub fn stride(&self) -> u32 {
        (self.fields.len() * self.scalar.size()) as u32
    }

    /// Number of scalars in one record.
    pub fn scalar_count(&self) -> usize {
        self.fields.len()
    }

    /// Byte offset of a field by name.
    pub fn offset_of(&self, name: &str) -> Option<u32> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.offset)
    }

    /// Byte offset of the first component of an attribute.
    pub fn attribute_offset(&self, semantic: VertexAttributeSemantic) -> Option<u32> {
        self.fields
            .iter()
            .find(|f| f.semantic == semantic)
            .map(|f| f.offset)
    }

    /// Scalar index (offset / scalar size) of the first component of an attribute.
    pub fn attribute_scalar_index(&self, semantic: VertexAttributeSemantic) -> Option<usize> {
        self.attribute_offset(semantic)
            .map(|offset| offset as usize / self.scalar.size())
    }

    /// Check if this layout has a specific semantic.
    pub fn has_semantic(&self, semantic: VertexAttributeSemantic) -> bool {
        self.fields.iter().any(|f| f.semantic == semantic)
    }
}

/// Layout of one face record: three indices `i0 i1 i2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FaceLayout {
    pub index_format: IndexFormat,
}

impl FaceLayout {
    /// Field names in record order.
    pub const FIELD_NAMES: [&'static str; 3] = ["i0", "i1", "i2"];

    pub fn new(index_format: IndexFormat) -> Self {
        Self { index_format }
    }

    /// Record size in bytes.
    pub fn stride(&self) -> u32 {
        3 * self.index_format.size() as u32
    }
}
