// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `gl-tutorials`.
//
// `gl-tutorials` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `gl-tutorials` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `gl-tutorials`. If not, see <https://www.gnu.org/licenses/>.

//! Vertex arrays together with the buffers that feed them.

use crate::backend::{
    BufferTarget, BufferUsage, DrawCall, GpuContext, IndexType, VertexAttribute,
};
use crate::{Error, Result};

use arrayvec::ArrayVec;
use bytemuck::Pod;

use std::fmt;
use std::rc::Rc;

/// The number of attribute slots a mesh can use, instance attribute included.
pub const MAX_ATTRIBUTES: usize = 4;

/// The component counts a vertex attribute can have.
const COMPONENTS: std::ops::RangeInclusive<usize> = 1..=4;

/// An index array.
#[derive(Debug, Clone, Copy)]
pub enum Indices<'a> {
    /// 16-bit indices.
    U16(&'a [u16]),

    /// 32-bit indices.
    U32(&'a [u32]),
}

impl Indices<'_> {
    fn len(&self) -> usize {
        match self {
            Indices::U16(indices) => indices.len(),
            Indices::U32(indices) => indices.len(),
        }
    }

    fn index_type(&self) -> IndexType {
        match self {
            Indices::U16(_) => IndexType::U16,
            Indices::U32(_) => IndexType::U32,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            Indices::U16(indices) => bytemuck::cast_slice(indices),
            Indices::U32(indices) => bytemuck::cast_slice(indices),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct AttributeData<'a> {
    components: i32,
    vertices: usize,
    data: &'a [f32],
}

impl<'a> AttributeData<'a> {
    fn new<const N: usize>(data: &'a [[f32; N]]) -> Self
    where
        [f32; N]: Pod,
    {
        Self {
            components: N as i32,
            vertices: data.len(),
            // Zero-sized elements cannot be cast; `build` rejects them.
            data: if N == 0 { &[] } else { bytemuck::cast_slice(data) },
        }
    }
}

/// Collects the arrays of a [`Mesh`] before uploading them.
///
/// Slot 0 is the position attribute, every [`with_attribute`](Self::with_attribute) takes the
/// next slot, and the instance attribute (if any) comes last.
#[derive(Debug, Clone)]
pub struct MeshBuilder<'a> {
    attributes: ArrayVec<AttributeData<'a>, MAX_ATTRIBUTES>,
    requested_slots: usize,
    indices: Option<Indices<'a>>,
    instance_components: Option<usize>,
}

impl<'a> MeshBuilder<'a> {
    /// Start a mesh from its vertex positions.
    pub fn new<const N: usize>(positions: &'a [[f32; N]]) -> Self
    where
        [f32; N]: Pod,
    {
        let mut attributes = ArrayVec::new();
        attributes.push(AttributeData::new(positions));

        Self {
            attributes,
            requested_slots: 1,
            indices: None,
            instance_components: None,
        }
    }

    /// Add a per-vertex attribute (a colour or a normal) at the next slot.
    pub fn with_attribute<const N: usize>(mut self, data: &'a [[f32; N]]) -> Self
    where
        [f32; N]: Pod,
    {
        self.requested_slots += 1;
        // Overflow is reported by `build`.
        let _ = self.attributes.try_push(AttributeData::new(data));
        self
    }

    /// Draw through an index array.
    pub fn with_indices(mut self, indices: Indices<'a>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Add a per-instance attribute of `components` floats, filled by
    /// [`Mesh::add_instance`].
    pub fn with_instances(mut self, components: usize) -> Self {
        self.instance_components = Some(components);
        self
    }

    /// Upload everything and describe the layout to a new vertex array.
    pub fn build<C: GpuContext>(self, context: Rc<C>) -> Result<Mesh<C>> {
        let slots = self.requested_slots + usize::from(self.instance_components.is_some());
        if slots > MAX_ATTRIBUTES {
            tracing::error!("[Mesh] {slots} attribute slots requested");
            return Err(Error::TooManyAttributes(slots));
        }

        let instance_slot = self.attributes.len();
        let components = self
            .attributes
            .iter()
            .map(|attribute| attribute.components as usize)
            .chain(self.instance_components);
        for (slot, found) in components.enumerate() {
            if !COMPONENTS.contains(&found) {
                if slot == instance_slot {
                    tracing::error!("[Mesh] instance attribute has {found} components");
                } else {
                    tracing::error!("[Mesh] attribute {slot} has {found} components");
                }
                return Err(Error::InvalidComponents {
                    slot: slot as u32,
                    found,
                });
            }
        }

        let vertex_count = self.attributes[0].vertices;
        for (slot, attribute) in self.attributes.iter().enumerate().skip(1) {
            if attribute.vertices != vertex_count {
                tracing::error!(
                    "[Mesh] attribute {slot} has {} vertices, expected {vertex_count}",
                    attribute.vertices
                );
                return Err(Error::VertexCount {
                    slot: slot as u32,
                    expected: vertex_count,
                    found: attribute.vertices,
                });
            }
        }

        let vertex_array = context.create_vertex_array()?;

        // Anything created below is released by `Drop` if a later step fails.
        let mut mesh = Mesh {
            context: context.clone(),
            vertex_array,
            vertex_buffers: ArrayVec::new(),
            index_buffer: None,
            instances: None,
            vertex_count,
            index_count: 0,
        };

        context.bind_vertex_array(Some(vertex_array));
        let _unbind = crate::CallOnDrop(|| context.bind_vertex_array(None));

        for (slot, attribute) in self.attributes.iter().enumerate() {
            let buffer = context.create_buffer()?;
            mesh.vertex_buffers.push(buffer);

            context.buffer_data(
                BufferTarget::Array,
                buffer,
                bytemuck::cast_slice(attribute.data),
                BufferUsage::Static,
            );
            context.vertex_attribute(
                buffer,
                VertexAttribute::per_vertex(slot as u32, attribute.components),
            );
        }

        if let Some(components) = self.instance_components {
            let buffer = context.create_buffer()?;
            mesh.instances = Some(Instances {
                buffer,
                components,
                data: Vec::new(),
            });

            context.vertex_attribute(
                buffer,
                VertexAttribute::per_instance(self.attributes.len() as u32, components as i32),
            );
        }

        if let Some(indices) = self.indices {
            let buffer = context.create_buffer()?;
            mesh.index_buffer = Some((buffer, indices.index_type()));
            mesh.index_count = indices.len();

            context.buffer_data(
                BufferTarget::ElementArray,
                buffer,
                indices.as_bytes(),
                BufferUsage::Static,
            );
        }

        Ok(mesh)
    }
}

#[derive(Debug)]
struct Instances<B> {
    buffer: B,
    components: usize,
    data: Vec<f32>,
}

/// A vertex array and the buffers it reads from.
pub struct Mesh<C: GpuContext> {
    context: Rc<C>,
    vertex_array: C::VertexArray,
    vertex_buffers: ArrayVec<C::Buffer, MAX_ATTRIBUTES>,
    index_buffer: Option<(C::Buffer, IndexType)>,
    instances: Option<Instances<C::Buffer>>,
    vertex_count: usize,
    index_count: usize,
}

impl<C: GpuContext> fmt::Debug for Mesh<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("vertex_array", &self.vertex_array)
            .field("vertex_buffers", &self.vertex_buffers)
            .field("index_buffer", &self.index_buffer)
            .field("instances", &self.instances)
            .field("vertex_count", &self.vertex_count)
            .field("index_count", &self.index_count)
            .finish_non_exhaustive()
    }
}

impl<C: GpuContext> Mesh<C> {
    /// The number of vertices uploaded at construction.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// The number of indices uploaded at construction, `0` without an index array.
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// The number of vertices (or indices) one draw covers.
    pub fn draw_count(&self) -> usize {
        if self.index_buffer.is_some() {
            self.index_count
        } else {
            self.vertex_count
        }
    }

    /// Whether the mesh was built with an instance attribute.
    pub fn is_instanced(&self) -> bool {
        self.instances.is_some()
    }

    /// The number of instances added so far.
    pub fn instance_count(&self) -> usize {
        self.instances
            .as_ref()
            .map_or(0, |instances| instances.data.len() / instances.components)
    }

    /// The draw call [`draw`](Self::draw) issues.
    pub fn draw_call(&self) -> DrawCall {
        let count = self.draw_count() as u32;

        match (self.index_buffer, &self.instances) {
            (None, None) => DrawCall::Arrays { count },
            (None, Some(_)) => DrawCall::ArraysInstanced {
                count,
                instances: self.instance_count() as u32,
            },
            (Some((_, index_type)), None) => DrawCall::Elements { count, index_type },
            (Some((_, index_type)), Some(_)) => DrawCall::ElementsInstanced {
                count,
                index_type,
                instances: self.instance_count() as u32,
            },
        }
    }

    /// Draw the whole mesh with the current program.
    ///
    /// An instanced mesh without instances draws nothing.
    pub fn draw(&self) {
        let call = self.draw_call();
        if call.instances() == 0 {
            return;
        }

        self.context.bind_vertex_array(Some(self.vertex_array));
        if let Some((buffer, _)) = self.index_buffer {
            self.context.bind_index_buffer(Some(buffer));
        }

        self.context.draw(call);
        self.context.bind_vertex_array(None);
    }

    /// Append one instance and upload the whole instance array again.
    pub fn add_instance(&mut self, element: &[f32]) -> Result<()> {
        let instances = self.instances.as_mut().ok_or(Error::NotInstanced)?;
        if element.len() != instances.components {
            return Err(Error::InstanceComponents {
                expected: instances.components,
                found: element.len(),
            });
        }

        instances.data.extend_from_slice(element);
        self.context.buffer_data(
            BufferTarget::Array,
            instances.buffer,
            bytemuck::cast_slice(&instances.data),
            BufferUsage::Dynamic,
        );

        tracing::debug!(
            "[Mesh] instance {} added at {element:?}",
            instances.data.len() / instances.components
        );
        Ok(())
    }
}

impl<C: GpuContext> Drop for Mesh<C> {
    fn drop(&mut self) {
        for buffer in self.vertex_buffers.drain(..) {
            self.context.delete_buffer(buffer);
        }
        if let Some((buffer, _)) = self.index_buffer.take() {
            self.context.delete_buffer(buffer);
        }
        if let Some(instances) = self.instances.take() {
            self.context.delete_buffer(instances.buffer);
        }
        self.context.delete_vertex_array(self.vertex_array);
    }
}
