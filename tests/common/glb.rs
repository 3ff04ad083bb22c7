//! Builds real GLB containers in memory so decode tests exercise the same
//! byte-level parse path as production assets.

const TRIANGLES: u32 = 4;

/// Assemble a binary glTF container from a JSON chunk and a BIN chunk.
pub fn assemble_glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json_chunk = json.as_bytes().to_vec();
    while json_chunk.len() % 4 != 0 {
        json_chunk.push(b' ');
    }
    let mut bin_chunk = bin.to_vec();
    while bin_chunk.len() % 4 != 0 {
        bin_chunk.push(0);
    }

    let total = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json_chunk);
    out.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin_chunk);
    out
}

/// A one-mesh, one-primitive GLB with configurable attributes.
pub struct GlbBuilder {
    positions: Option<Vec<[f32; 3]>>,
    colors: Option<Vec<[f32; 3]>>,
    normals: Option<Vec<[f32; 3]>>,
    indices: Option<Vec<u16>>,
    mode: u32,
}

impl GlbBuilder {
    /// A unit quad in the z=0 plane: 4 vertices, 6 indices, triangle list.
    pub fn quad() -> Self {
        Self {
            positions: Some(vec![
                [-0.5, -0.5, 0.0],
                [0.5, -0.5, 0.0],
                [-0.5, 0.5, 0.0],
                [0.5, 0.5, 0.0],
            ]),
            colors: None,
            normals: None,
            indices: Some(vec![0, 1, 2, 2, 1, 3]),
            mode: TRIANGLES,
        }
    }

    pub fn positions(mut self, positions: Option<Vec<[f32; 3]>>) -> Self {
        self.positions = positions;
        self
    }

    pub fn colors(mut self, colors: Vec<[f32; 3]>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn indices(mut self, indices: Option<Vec<u16>>) -> Self {
        self.indices = indices;
        self
    }

    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut bin: Vec<u8> = Vec::new();
        let mut views: Vec<String> = Vec::new();
        let mut accessors: Vec<String> = Vec::new();
        let mut attributes: Vec<String> = Vec::new();

        let mut add_vec3 = |bin: &mut Vec<u8>,
                            views: &mut Vec<String>,
                            accessors: &mut Vec<String>,
                            data: &[[f32; 3]],
                            with_bounds: bool| {
            let offset = bin.len();
            for v in data {
                for f in v {
                    bin.extend_from_slice(&f.to_le_bytes());
                }
            }
            views.push(format!(
                r#"{{"buffer":0,"byteOffset":{offset},"byteLength":{}}}"#,
                data.len() * 12
            ));
            let bounds = if with_bounds {
                let mut min = [f32::INFINITY; 3];
                let mut max = [f32::NEG_INFINITY; 3];
                for v in data {
                    for i in 0..3 {
                        min[i] = min[i].min(v[i]);
                        max[i] = max[i].max(v[i]);
                    }
                }
                format!(
                    r#","min":[{},{},{}],"max":[{},{},{}]"#,
                    min[0], min[1], min[2], max[0], max[1], max[2]
                )
            } else {
                String::new()
            };
            accessors.push(format!(
                r#"{{"bufferView":{},"componentType":5126,"count":{},"type":"VEC3"{bounds}}}"#,
                views.len() - 1,
                data.len()
            ));
            accessors.len() - 1
        };

        if let Some(positions) = &self.positions {
            let accessor = add_vec3(&mut bin, &mut views, &mut accessors, positions, true);
            attributes.push(format!(r#""POSITION":{accessor}"#));
        }
        if let Some(colors) = &self.colors {
            let accessor = add_vec3(&mut bin, &mut views, &mut accessors, colors, false);
            attributes.push(format!(r#""COLOR_0":{accessor}"#));
        }
        if let Some(normals) = &self.normals {
            let accessor = add_vec3(&mut bin, &mut views, &mut accessors, normals, false);
            attributes.push(format!(r#""NORMAL":{accessor}"#));
        }

        let indices_field = match &self.indices {
            Some(indices) => {
                while bin.len() % 4 != 0 {
                    bin.push(0);
                }
                let offset = bin.len();
                for i in indices {
                    bin.extend_from_slice(&i.to_le_bytes());
                }
                views.push(format!(
                    r#"{{"buffer":0,"byteOffset":{offset},"byteLength":{}}}"#,
                    indices.len() * 2
                ));
                accessors.push(format!(
                    r#"{{"bufferView":{},"componentType":5123,"count":{},"type":"SCALAR"}}"#,
                    views.len() - 1,
                    indices.len()
                ));
                format!(r#""indices":{},"#, accessors.len() - 1)
            }
            None => String::new(),
        };

        let json = format!(
            concat!(
                r#"{{"asset":{{"version":"2.0"}},"#,
                r#""buffers":[{{"byteLength":{buffer_len}}}],"#,
                r#""bufferViews":[{views}],"#,
                r#""accessors":[{accessors}],"#,
                r#""meshes":[{{"primitives":[{{"attributes":{{{attributes}}},{indices}"mode":{mode}}}]}}],"#,
                r#""nodes":[{{"mesh":0}}],"#,
                r#""scenes":[{{"nodes":[0]}}],"#,
                r#""scene":0}}"#
            ),
            buffer_len = bin.len(),
            views = views.join(","),
            accessors = accessors.join(","),
            attributes = attributes.join(","),
            indices = indices_field,
            mode = self.mode,
        );

        assemble_glb(&json, &bin)
    }
}
