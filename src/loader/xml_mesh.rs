//! Reader for the XML mesh format:
//!
//! ```xml
//! <mesh>
//!     <attribute index="0" type="float" size="3"> 0 0 0  1 0 0  0 1 0 </attribute>
//!     <attribute index="1" type="norm-ubyte" size="4"> 255 0 0 255 ... </attribute>
//!     <vao name="flat">
//!         <source attrib="0"/>
//!     </vao>
//!     <indices cmd="triangles" type="ushort"> 0 1 2 </indices>
//!     <arrays cmd="points" start="0" count="3"/>
//! </mesh>
//! ```

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::{
    mesh::{
        Attribute, AttributeType, IndexType, Mesh, MeshData, MeshError, Primitive, RenderCommand,
    },
    resources::load_string,
};

fn xml_error(error: impl std::fmt::Display) -> MeshError {
    MeshError::Xml(error.to_string())
}

fn parse_int(value: &str) -> Result<u32, MeshError> {
    value.trim().parse().map_err(|_| MeshError::InvalidNumber {
        value: value.to_string(),
        ty: "integer",
    })
}

fn tag_name(tag: &BytesStart) -> String {
    String::from_utf8_lossy(tag.name().as_ref()).into_owned()
}

fn optional(tag: &BytesStart, name: &str) -> Result<Option<String>, MeshError> {
    Ok(tag
        .try_get_attribute(name)
        .map_err(xml_error)?
        .map(|a| String::from_utf8_lossy(&a.value).into_owned()))
}

fn required(tag: &BytesStart, name: &str) -> Result<String, MeshError> {
    optional(tag, name)?
        .ok_or_else(|| MeshError::Parse(format!("<{}> missing '{}'", tag_name(tag), name)))
}

struct Parser<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(true);
        Self { reader }
    }

    fn next(&mut self) -> Result<Event<'a>, MeshError> {
        loop {
            match self.reader.read_event().map_err(xml_error)? {
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => continue,
                event => return Ok(event),
            }
        }
    }

    /// Collects the text up to the closing tag of `parent`.
    fn text(&mut self, parent: &str) -> Result<String, MeshError> {
        let mut text = String::new();
        loop {
            match self.next()? {
                Event::Text(t) => {
                    text.push(' ');
                    text.push_str(&String::from_utf8_lossy(&t));
                }
                Event::CData(t) => {
                    text.push(' ');
                    text.push_str(&String::from_utf8_lossy(&t));
                }
                Event::End(_) => return Ok(text),
                Event::Start(tag) | Event::Empty(tag) => {
                    return Err(MeshError::Parse(format!(
                        "Unexpected <{}> inside <{}>",
                        tag_name(&tag),
                        parent
                    )));
                }
                Event::Eof => return Err(MeshError::Parse(format!("Unclosed <{}>", parent))),
                _ => {}
            }
        }
    }
}

#[derive(Default)]
struct Builder {
    attribute_data: Vec<u8>,
    index_data: Option<Vec<u8>>,
    attributes: Vec<Attribute>,
    commands: Vec<RenderCommand>,
    vaos: Vec<(String, Vec<u32>)>,
}

impl Builder {
    fn element(&mut self, parser: &mut Parser, tag: &BytesStart, empty: bool) -> Result<(), MeshError> {
        match tag_name(tag).as_str() {
            "attribute" => {
                let index = required(tag, "index")?;
                let ty = required(tag, "type")?;
                let size = required(tag, "size")?;
                let text = if empty { String::new() } else { parser.text("attribute")? };
                let tokens: Vec<&str> = text.split_whitespace().collect();
                let attribute = Attribute::store_data(
                    parse_int(&index)?,
                    AttributeType::from_name(&ty)?,
                    parse_int(&size)?,
                    &tokens,
                    &mut self.attribute_data,
                )?;
                self.attributes.push(attribute);
            }
            "indices" => {
                let cmd = required(tag, "cmd")?;
                let ty = required(tag, "type")?;
                let text = if empty { String::new() } else { parser.text("indices")? };
                let tokens: Vec<&str> = text.split_whitespace().collect();
                let command = RenderCommand::store_indices(
                    Primitive::from_name(&cmd)?,
                    IndexType::from_name(&ty)?,
                    &tokens,
                    self.index_data.get_or_insert_with(Vec::new),
                )?;
                self.commands.push(command);
            }
            "vao" => {
                let name = required(tag, "name")?;
                let mut sources = Vec::new();
                if !empty {
                    loop {
                        let (source, source_empty) = match parser.next()? {
                            Event::Start(source) => (source, false),
                            Event::Empty(source) => (source, true),
                            Event::End(_) => break,
                            Event::Eof => return Err(MeshError::Parse("Unclosed <vao>".to_string())),
                            _ => continue,
                        };
                        if tag_name(&source) != "source" {
                            return Err(MeshError::Parse(format!(
                                "Invalid TAG name: {}",
                                tag_name(&source)
                            )));
                        }
                        sources.push(parse_int(&required(&source, "attrib")?)?);
                        if !source_empty {
                            parser.text("source")?;
                        }
                    }
                }
                self.vaos.push((name, sources));
            }
            "arrays" => {
                let cmd = required(tag, "cmd")?;
                let start = required(tag, "start")?;
                let count = required(tag, "count")?;
                if !empty {
                    parser.text("arrays")?;
                }
                self.commands.push(RenderCommand::Arrays {
                    primitive: Primitive::from_name(&cmd)?,
                    start: parse_int(&start)?,
                    count: parse_int(&count)?,
                });
            }
            other => return Err(MeshError::Parse(format!("Invalid TAG name: {}", other))),
        }
        Ok(())
    }

    fn finish(self) -> Result<MeshData, MeshError> {
        if self.attributes.is_empty() {
            return Err(MeshError::Parse(
                "There must be at least 1 set of attributes.".to_string(),
            ));
        }
        if self.commands.is_empty() {
            return Err(MeshError::Parse(
                "There must be at least 1 render command.".to_string(),
            ));
        }
        let mut data = MeshData::new(
            self.attribute_data,
            self.attributes,
            self.commands,
            self.index_data,
        )?;
        data.variations.extend(self.vaos);
        Ok(data)
    }
}

/// A parsed XML mesh, ready to be uploaded any number of times.
#[derive(Debug, Clone)]
pub struct XmlMeshLoader {
    name: String,
    data: MeshData,
}

impl XmlMeshLoader {
    pub fn parse(source: &str) -> Result<Self, MeshError> {
        Self::parse_named(source, "xml mesh")
    }

    fn parse_named(source: &str, name: &str) -> Result<Self, MeshError> {
        let mut parser = Parser::new(source);

        let (root, empty) = loop {
            match parser.next()? {
                Event::Start(tag) => break (tag, false),
                Event::Empty(tag) => break (tag, true),
                Event::Eof => return Err(MeshError::Parse("Expected a <mesh> tag.".to_string())),
                _ => {}
            }
        };
        if tag_name(&root) != "mesh" {
            return Err(MeshError::Parse(format!(
                "Expected a <mesh> tag, found <{}>.",
                tag_name(&root)
            )));
        }

        let mut builder = Builder::default();
        if !empty {
            loop {
                match parser.next()? {
                    Event::Start(tag) => builder.element(&mut parser, &tag, false)?,
                    Event::Empty(tag) => builder.element(&mut parser, &tag, true)?,
                    Event::End(_) | Event::Eof => break,
                    Event::Text(_) | Event::CData(_) => {
                        return Err(MeshError::Parse("Unexpected text inside <mesh>".to_string()));
                    }
                    _ => {}
                }
            }
        }

        let data = builder.finish()?;
        log::info!(
            "Loaded {} with {} attributes and {} render commands.",
            name,
            data.attributes.len(),
            data.commands.len()
        );
        Ok(Self {
            name: name.to_string(),
            data,
        })
    }

    /// Reads and parses `file_name` from the assets.
    pub async fn load(file_name: &str) -> anyhow::Result<Self> {
        let source = load_string(file_name).await?;
        Ok(Self::parse_named(&source, file_name)?)
    }

    pub fn data(&self) -> &MeshData {
        &self.data
    }

    pub fn into_data(self) -> MeshData {
        self.data
    }

    /// Mesh with every attribute.
    pub fn create_default_mesh(&self, device: &wgpu::Device) -> Result<Mesh, MeshError> {
        Mesh::new(device, &self.data, &self.name)
    }

    /// Mesh with only the attributes listed by `<vao name="...">`.
    pub fn create_mesh(&self, device: &wgpu::Device, name: &str) -> Result<Mesh, MeshError> {
        Mesh::variation(device, &self.data, name, &format!("{} ({})", self.name, name))
    }

    pub async fn create(device: &wgpu::Device, file_name: &str) -> anyhow::Result<Mesh> {
        Ok(Self::load(file_name).await?.create_default_mesh(device)?)
    }
}
