use demo_kit::{
    loader::XmlMeshLoader,
    mesh::{AttributeType, DrawCall, IndexType, MeshError, Primitive, RenderCommand},
};

const QUAD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mesh xmlns="http://www.arcsynthesis.com/gltut/mesh">
    <!-- two triangles and the same quad as a fan -->
    <attribute index="0" type="float" size="3">
        -1 -1 0
         1 -1 0
         1  1 0
        -1  1 0
    </attribute>
    <attribute index="1" type="norm-ubyte" size="4">
        255 0 0 255
        0 255 0 255
        0 0 255 255
        255 255 255 255
    </attribute>
    <vao name="flat">
        <source attrib="0"/>
    </vao>
    <indices cmd="triangles" type="ushort">0 1 2 2 3 0</indices>
    <arrays cmd="tri-fan" start="0" count="4"/>
</mesh>
"#;

fn parse_error(source: &str) -> String {
    match XmlMeshLoader::parse(source) {
        Ok(_) => panic!("{} parsed", source),
        Err(e) => e.to_string(),
    }
}

#[test]
fn should_parse_attributes_and_commands() {
    let loader = XmlMeshLoader::parse(QUAD).unwrap();
    let data = loader.data();

    assert_eq!(data.attributes.len(), 2);
    let position = &data.attributes[0];
    assert_eq!(position.index, 0);
    assert_eq!(position.ty, AttributeType::Float);
    assert_eq!(position.size, 3);
    assert_eq!(position.offset, 0);
    assert_eq!(position.vertex_count, 4);

    let colour = &data.attributes[1];
    assert_eq!(colour.ty, AttributeType::NormUByte);
    assert_eq!(colour.offset, 48);
    assert_eq!(colour.vertex_count, 4);
    assert_eq!(&data.attribute_data[48..52], &[255, 0, 0, 255]);

    assert_eq!(
        data.commands,
        vec![
            RenderCommand::Indexed {
                primitive: Primitive::Triangles,
                index_type: IndexType::UShort,
                start: 0,
                count: 6,
            },
            RenderCommand::Arrays {
                primitive: Primitive::TriFan,
                start: 0,
                count: 4,
            },
        ]
    );
}

#[test]
fn should_plan_fans_as_triangle_lists() {
    let loader = XmlMeshLoader::parse(QUAD).unwrap();
    let plan = loader.data().plan().unwrap();

    assert_eq!(
        plan.draws,
        vec![
            DrawCall::Indexed {
                topology: wgpu::PrimitiveTopology::TriangleList,
                format: wgpu::IndexFormat::Uint16,
                bytes: 0..12,
                count: 6,
            },
            DrawCall::Indexed {
                topology: wgpu::PrimitiveTopology::TriangleList,
                format: wgpu::IndexFormat::Uint32,
                bytes: 12..36,
                count: 6,
            },
        ]
    );
    let fan: Vec<u32> = plan.indices[12..36]
        .chunks_exact(4)
        .map(|b| u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    assert_eq!(fan, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn should_select_named_variations() {
    let loader = XmlMeshLoader::parse(QUAD).unwrap();
    let flat = loader.data().variation("flat").unwrap();
    assert_eq!(flat.len(), 1);
    assert_eq!(flat[0].index, 0);

    let missing = loader.data().variation("smooth").unwrap_err();
    assert_eq!(missing.to_string(), "No mesh variation named 'smooth'.");
}

#[test]
fn should_require_attributes_and_commands() {
    assert_eq!(
        parse_error(r#"<mesh><arrays cmd="points" start="0" count="1"/></mesh>"#),
        "There must be at least 1 set of attributes."
    );
    assert_eq!(
        parse_error(r#"<mesh><attribute index="0" type="float" size="3">0 0 0</attribute></mesh>"#),
        "There must be at least 1 render command."
    );
}

#[test]
fn should_reject_arrays_outside_the_vertices() {
    assert_eq!(
        parse_error(r#"<mesh><attribute index="0" type="float" size="1">0 1</attribute><arrays cmd="points" start="4294967295" count="2"/></mesh>"#),
        "Vertices 4294967295+2 lie outside the 2 vertices of the mesh."
    );
    assert_eq!(
        parse_error(r#"<mesh><attribute index="0" type="float" size="1">0 1</attribute><arrays cmd="tri-fan" start="0" count="4000000000"/></mesh>"#),
        "Vertices 0+4000000000 lie outside the 2 vertices of the mesh."
    );
}

#[test]
fn should_reject_unknown_tags_and_names() {
    assert_eq!(parse_error("<mesh><foo/></mesh>"), "Invalid TAG name: foo");
    assert_eq!(
        parse_error("<model></model>"),
        "Expected a <mesh> tag, found <model>."
    );
    assert_eq!(
        parse_error(r#"<mesh><attribute index="0" type="double" size="1">0</attribute></mesh>"#),
        "Unsupported attribute type: double"
    );
    assert_eq!(
        parse_error(r#"<mesh><attribute index="0" type="float" size="1">0</attribute><arrays cmd="quads" start="0" count="1"/></mesh>"#),
        "Invalid primitive name: quads"
    );
    assert_eq!(
        parse_error(r#"<mesh><attribute index="0" size="1">0</attribute></mesh>"#),
        "<attribute> missing 'type'"
    );
}

#[test]
fn should_reject_malformed_values() {
    let err = XmlMeshLoader::parse(
        r#"<mesh><attribute index="0" type="float" size="1">0 abc</attribute></mesh>"#,
    )
    .unwrap_err();
    assert!(matches!(err, MeshError::InvalidNumber { ref value, .. } if value == "abc"));

    assert_eq!(
        parse_error(r#"<mesh><attribute index="2" type="float" size="3">0 0 0 0</attribute></mesh>"#),
        "<attribute> 2 has 4 values, which is not a multiple of its size 3"
    );
    assert!(matches!(
        XmlMeshLoader::parse(r#"<mesh><attribute index="0" type="float" size="5">0 0 0 0 0</attribute></mesh>"#),
        Err(MeshError::InvalidSize { index: 0, size: 5 })
    ));
}

#[test]
fn should_widen_ubyte_indices() {
    let loader = XmlMeshLoader::parse(
        r#"<mesh>
            <attribute index="0" type="float" size="2">0 0 1 0 1 1</attribute>
            <indices cmd="line-loop" type="ubyte">0 1 2</indices>
        </mesh>"#,
    )
    .unwrap();
    let plan = loader.data().plan().unwrap();

    assert_eq!(
        plan.draws,
        vec![DrawCall::Indexed {
            topology: wgpu::PrimitiveTopology::LineStrip,
            format: wgpu::IndexFormat::Uint16,
            bytes: 0..8,
            count: 4,
        }]
    );
    let indices: Vec<u16> = plan
        .indices
        .chunks_exact(2)
        .map(|b| u16::from_ne_bytes([b[0], b[1]]))
        .collect();
    assert_eq!(indices, vec![0, 1, 2, 0]);
}
