use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddressIn {
    /// ENVIO | ENTREGA
    pub tipo: String,
    pub calle_y_numero: String,
    #[serde(default)]
    pub ciudad: String,
    #[serde(default)]
    pub provincia: String,
    #[serde(default)]
    pub pais: String,
    #[serde(default)]
    pub cp: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BankingIn {
    pub cbu_o_alias: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CryptoWalletIn {
    pub red: String,
    pub address: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub nombre: String,
    pub apellido: String,
    pub tipo_doc: String,
    pub nro_doc: String,
    pub email: String,
    pub tel: Option<String>,
    pub palabra_seg: Option<String>,
    pub password: String,
    #[serde(default)]
    pub acepta_terminos: bool,
    pub roles: Vec<String>,
    pub domicilio_envio: Option<AddressIn>,
    pub domicilio_entrega: Option<AddressIn>,
    pub banking: Option<BankingIn>,
    #[serde(default)]
    pub wallets: Vec<CryptoWalletIn>,
}

/// Same shape as registration; password is only changed when provided.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub nombre: String,
    pub apellido: String,
    pub tipo_doc: String,
    pub nro_doc: String,
    pub email: String,
    pub tel: Option<String>,
    pub palabra_seg: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub acepta_terminos: bool,
    pub roles: Vec<String>,
    pub domicilio_envio: Option<AddressIn>,
    pub domicilio_entrega: Option<AddressIn>,
    pub banking: Option<BankingIn>,
    #[serde(default)]
    pub wallets: Vec<CryptoWalletIn>,
}

/// Metadata-only registration; file transport/storage is out of scope.
#[derive(Debug, Deserialize, ToSchema)]
pub struct KycDocumentIn {
    #[serde(default = "default_kyc_tipo")]
    pub tipo: String,
    pub filename: String,
    pub mime: String,
    pub size_bytes: i64,
}

fn default_kyc_tipo() -> String {
    "OTRO".to_string()
}
