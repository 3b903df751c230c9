use camahjucunu_decoders::{BoardPipeline, EndpointRef};
use pretty_assertions::assert_eq;

const BOARD: &str = "\
# wave routing for the training board
CIRCUIT training_loop
  INSTANCE src tsi.source.binance
  INSTANCE wik tsi.wikimyei.representation.vicreg_0x0001
  HOP src@wave:tensor -> wik@jkimyei:tensor
  INVOKE run_contract {\"epochs\": 3}
ENDCIRCUIT

CIRCUIT echo_probe
  INSTANCE probe board.wave
ENDCIRCUIT
";

#[test]
fn decodes_circuits_with_instances_hops_and_invoke() {
    let pipeline = BoardPipeline::new().expect("built-in grammar builds");
    let decoded = pipeline.decode(BOARD).expect("instruction decodes");

    assert_eq!(decoded.circuits.len(), 2);

    let circuit = &decoded.circuits[0];
    assert_eq!(circuit.name, "training_loop");
    assert_eq!(circuit.instances.len(), 2);
    assert_eq!(circuit.instances[0].alias, "src");
    assert_eq!(circuit.instances[0].tsi_type, "tsi.source.binance");
    assert_eq!(
        circuit.instances[1].tsi_type,
        "tsi.wikimyei.representation.vicreg_0x0001"
    );

    assert_eq!(circuit.hops.len(), 1);
    assert_eq!(
        circuit.hops[0].from,
        EndpointRef {
            instance: "src".to_string(),
            directive: "wave".to_string(),
            kind: "tensor".to_string(),
        }
    );
    assert_eq!(
        circuit.hops[0].to,
        EndpointRef {
            instance: "wik".to_string(),
            directive: "jkimyei".to_string(),
            kind: "tensor".to_string(),
        }
    );

    assert_eq!(circuit.invoke_name, "run_contract");
    assert_eq!(circuit.invoke_payload, "{\"epochs\": 3}");
}

#[test]
fn circuit_without_hops_or_invoke_decodes() {
    let pipeline = BoardPipeline::new().unwrap();
    let decoded = pipeline.decode(BOARD).unwrap();
    let circuit = &decoded.circuits[1];
    assert_eq!(circuit.name, "echo_probe");
    assert_eq!(circuit.instances.len(), 1);
    assert!(circuit.hops.is_empty());
    assert!(circuit.invoke_name.is_empty());
}

#[test]
fn unterminated_circuit_is_a_parse_error() {
    let pipeline = BoardPipeline::new().unwrap();
    let bad = "CIRCUIT broken\n  INSTANCE a board.wave\n";
    assert!(pipeline.decode(bad).is_err());
}
