use jsonwebtoken::errors::Error;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::configs::Auth;
use crate::models::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: i32,
    pub role: String,
    pub token: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: i32,
    pub email: String,
    pub role: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Clone)]
pub struct TokenService {
    expiration: u64,
    secret: String,
}

impl TokenService {
    pub fn new(auth: Auth) -> Self {
        Self {
            expiration: auth.expiration,
            secret: auth.secret.clone(),
        }
    }

    pub fn retrieve_token_claims(&self, token: &str) -> Result<TokenData<TokenClaims>, Error> {
        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
    }

    pub fn generate_token(&self, user: &User) -> Result<Token, Error> {
        let iat = OffsetDateTime::now_utc().unix_timestamp().max(0) as u64;
        let exp = iat + self.expiration;

        let claims = TokenClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            iat,
            exp,
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_ref());

        let token = encode(&Header::default(), &claims, &encoding_key)?;

        Ok(Token {
            id: claims.sub,
            role: claims.role,
            token,
            iat,
            exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(Auth {
            secret: String::from(secret),
            expiration: 1000,
            admin: None,
        })
    }

    fn user() -> User {
        User {
            id: 7,
            nom: String::from("Test"),
            email: String::from("test@test.com"),
            password: String::from("test"),
            role: String::from("operateur"),
            actif: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_generate_and_retrieve_token() {
        let token_service = service("test");
        let user = user();

        let token = token_service.generate_token(&user).unwrap();
        assert_eq!(token.exp - token.iat, 1000);

        let claims = token_service
            .retrieve_token_claims(&token.token)
            .unwrap()
            .claims;

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, user.role);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = service("first").generate_token(&user()).unwrap();

        assert!(service("second").retrieve_token_claims(&token.token).is_err());
    }
}
